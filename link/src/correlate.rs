//! Soft-key correlation between RowSets.
//!
//! Keys are compared after [`key_string`] coercion, so a numeric `5` from one
//! operation matches `"5"` from another. Joins are one-to-many and never drop
//! a primary row.
//!
//! When the secondary key has historically been spelled several ways, pass a
//! [`KeyAliasTable`] instead of a field name; the first alias present with a
//! non-null value wins.

use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

use crate::models::{key_string, Row, RowSet};

/// Ordered list of field names that all mean the same logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAliasTable {
    pub name: &'static str,
    /// Bumped whenever the alias list changes
    pub version: u32,
    /// Priority order
    pub aliases: &'static [&'static str],
}

impl KeyAliasTable {
    /// First alias holding a non-null value, with that value.
    pub fn resolve<'r>(&self, row: &'r Row) -> Option<(&'static str, &'r JsonValue)> {
        self.aliases.iter().find_map(|alias| match row.get(alias) {
            Some(JsonValue::Null) | None => None,
            Some(value) => Some((*alias, value)),
        })
    }

    pub fn key_of(&self, row: &Row) -> Option<String> {
        self.resolve(row).and_then(|(_, value)| key_string(value))
    }
}

/// Parent id carried by attachment/image rows.
pub const ATTACHMENT_RELATIVE_ID_ALIASES: KeyAliasTable = KeyAliasTable {
    name: "attachment-relative-id",
    version: 1,
    aliases: &[
        "attachmentRelativeID",
        "attachmentRelativeId",
        "attachmentrelativeid",
        "relativeid",
        "RelativeID",
    ],
};

/// Every alias table shipped with the crate.
pub const ALIAS_TABLES: &[KeyAliasTable] = &[ATTACHMENT_RELATIVE_ID_ALIASES];

/// Look up a shipped alias table by name.
pub fn alias_table(name: &str) -> Option<&'static KeyAliasTable> {
    ALIAS_TABLES.iter().find(|table| table.name == name)
}

/// How to read a join key from a row.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'k> {
    Field(&'k str),
    Aliases(&'k KeyAliasTable),
}

impl KeySource<'_> {
    pub fn key_of(&self, row: &Row) -> Option<String> {
        match self {
            KeySource::Field(field) => row.get_string(field),
            KeySource::Aliases(table) => table.key_of(row),
        }
    }
}

impl<'k> From<&'k str> for KeySource<'k> {
    fn from(field: &'k str) -> Self {
        KeySource::Field(field)
    }
}

impl<'k> From<&'k KeyAliasTable> for KeySource<'k> {
    fn from(table: &'k KeyAliasTable) -> Self {
        KeySource::Aliases(table)
    }
}

/// Result of a join: one match list per primary row, same order and length.
#[derive(Debug, Clone)]
pub struct Correlation<'p, 's> {
    primary: &'p RowSet,
    matches: Vec<Vec<&'s Row>>,
}

impl<'p, 's> Correlation<'p, 's> {
    /// Matches for the primary row at `index` (empty when unmatched or out of range)
    pub fn matches(&self, index: usize) -> &[&'s Row] {
        self.matches.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First-match convenience
    pub fn first(&self, index: usize) -> Option<&'s Row> {
        self.matches(index).first().copied()
    }

    /// `(primary row, matches)` in primary order
    pub fn iter(&self) -> impl Iterator<Item = (&'p Row, &[&'s Row])> + '_ {
        self.primary
            .rows
            .iter()
            .zip(self.matches.iter().map(Vec::as_slice))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Primary rows with at least one match
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_empty()).count()
    }

    /// Owned form keyed by primary row index
    pub fn into_index_map(self) -> BTreeMap<usize, Vec<Row>> {
        self.matches
            .into_iter()
            .enumerate()
            .map(|(index, rows)| (index, rows.into_iter().cloned().collect()))
            .collect()
    }
}

/// Group rows by coerced key, keeping row order within each group.
/// Rows without a key are left out.
pub fn index_by<'s, 'k>(rows: &'s RowSet, key: impl Into<KeySource<'k>>) -> HashMap<String, Vec<&'s Row>> {
    let key = key.into();
    let mut index: HashMap<String, Vec<&'s Row>> = HashMap::new();
    for row in &rows.rows {
        if let Some(k) = key.key_of(row) {
            index.entry(k).or_default().push(row);
        }
    }
    index
}

/// One-to-many join of `secondary` onto `primary`.
///
/// # Examples
///
/// ```rust
/// use batch_link::{correlate, Row, RowSet};
/// use serde_json::json;
///
/// let parents = RowSet::new("Parent", vec![
///     serde_json::from_value::<Row>(json!({ "parentId": 1 })).unwrap(),
/// ]);
/// let children = RowSet::new("Child", vec![
///     serde_json::from_value::<Row>(json!({ "childParentId": "1" })).unwrap(),
/// ]);
///
/// let joined = correlate::join(&parents, &children, "parentId", "childParentId");
/// assert_eq!(joined.matches(0).len(), 1);
/// ```
pub fn join<'p, 's, 'a, 'b>(
    primary: &'p RowSet,
    secondary: &'s RowSet,
    primary_key: impl Into<KeySource<'a>>,
    secondary_key: impl Into<KeySource<'b>>,
) -> Correlation<'p, 's> {
    let primary_key = primary_key.into();
    let index = index_by(secondary, secondary_key);

    let matches = primary
        .rows
        .iter()
        .map(|row| {
            primary_key
                .key_of(row)
                .and_then(|k| index.get(&k).cloned())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();

    log::debug!(
        "[CORRELATE] {} -> {}: {}/{} primary rows matched",
        secondary.label,
        primary.label,
        matches.iter().filter(|m| !m.is_empty()).count(),
        matches.len()
    );

    Correlation { primary, matches }
}

/// Join keeping only the first match per primary row.
pub fn join_first<'p, 's, 'a, 'b>(
    primary: &'p RowSet,
    secondary: &'s RowSet,
    primary_key: impl Into<KeySource<'a>>,
    secondary_key: impl Into<KeySource<'b>>,
) -> Vec<Option<&'s Row>> {
    let correlation = join(primary, secondary, primary_key, secondary_key);
    (0..correlation.len()).map(|i| correlation.first(i)).collect()
}

/// Join where the secondary key is found through an alias table.
pub fn join_by_alias<'p, 's, 'a>(
    primary: &'p RowSet,
    secondary: &'s RowSet,
    primary_key: impl Into<KeySource<'a>>,
    aliases: &KeyAliasTable,
) -> Correlation<'p, 's> {
    join(primary, secondary, primary_key, aliases)
}
