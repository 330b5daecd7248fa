//! Batch response decoding.
//!
//! Each `JsonData` entry is parsed a second time and the dataset inside it is
//! located, unwrapped from `TableData`, and stripped of sentinel rows.
//!
//! Datasets are found by name, never by position. For every top-level key of
//! an entry's payload the decoder tries, in order:
//!
//! 1. the entry's echoed label, when the backend sends one
//! 2. an operation label from the batch
//! 3. an operation resource from the batch (the backend sometimes names the
//!    payload after the table or procedure)
//! 4. the only key in the object, if there is exactly one; it fills the
//!    echoed label or else the first operation still without a result
//!
//! A payload that fails any of these steps becomes a [`DecodeFailure`] and an
//! empty RowSet for the affected label. Other labels are unaffected. A failed
//! entry with no label of its own is charged to the only operation left
//! without a result, when there is exactly one.

use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};

use crate::{
    error::DecodeError,
    models::{Batch, BatchEntry, BatchResponse, OperationDescriptor, Row, RowSet, TableData},
};

const TABLE_DATA_KEY: &str = "TableData";

/// Why one entry (or one dataset inside it) was dropped.
#[derive(Debug)]
pub struct DecodeFailure {
    /// Position of the entry in the response
    pub entry_index: usize,
    /// Affected label, when it could be determined
    pub label: Option<String>,
    pub error: DecodeError,
}

/// Decoded reply: one RowSet per label, plus contained failures.
///
/// Lookups for a label that is not present return an empty result.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    sets: Vec<RowSet>,
    failures: Vec<DecodeFailure>,
}

impl DecodedBatch {
    /// Rows for `label`; empty when the label is absent or failed
    pub fn rows(&self, label: &str) -> &[Row] {
        self.row_set(label).map(|set| set.rows.as_slice()).unwrap_or(&[])
    }

    pub fn row_set(&self, label: &str) -> Option<&RowSet> {
        self.sets.iter().find(|set| set.label == label)
    }

    /// Move a RowSet out, leaving nothing behind. Missing labels give an empty set.
    pub fn take(&mut self, label: &str) -> RowSet {
        match self.sets.iter().position(|set| set.label == label) {
            Some(pos) => self.sets.remove(pos),
            None => RowSet::empty(label),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.row_set(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|set| set.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn failures(&self) -> &[DecodeFailure] {
        &self.failures
    }

    /// True when every entry decoded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_row_sets(self) -> Vec<RowSet> {
        self.sets
    }

    fn insert(&mut self, set: RowSet) {
        match self.sets.iter_mut().find(|existing| existing.label == set.label) {
            Some(existing) => {
                debug!("[BATCH_DECODE] Merging repeated dataset '{}'", set.label);
                if existing.rows.is_empty() && existing.notice.is_none() {
                    existing.notice = set.notice;
                }
                existing.rows.extend(set.rows);
                if !existing.rows.is_empty() {
                    existing.notice = None;
                }
            },
            None => self.sets.push(set),
        }
    }

    fn fail(&mut self, entry_index: usize, label: Option<String>, error: DecodeError) {
        warn!(
            "[BATCH_DECODE] Entry {} (label={}) downgraded to empty: {}",
            entry_index,
            label.as_deref().unwrap_or("<unknown>"),
            error
        );
        if let Some(label) = &label {
            if !self.contains(label) {
                self.sets.push(RowSet::empty(label.clone()));
            }
        }
        self.failures.push(DecodeFailure {
            entry_index,
            label,
            error,
        });
    }
}

/// Decodes a [`BatchResponse`], optionally using the originating batch to
/// resolve resource-named payloads and to fill in labels that never came back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder<'b> {
    operations: &'b [OperationDescriptor],
}

impl ResponseDecoder<'static> {
    /// Decoder with no batch context: payload keys become labels.
    pub fn new() -> Self {
        Self { operations: &[] }
    }
}

impl<'b> ResponseDecoder<'b> {
    pub fn for_batch(batch: &'b Batch) -> Self {
        Self {
            operations: &batch.operations,
        }
    }

    /// Never fails: malformed entries are recorded in [`DecodedBatch::failures`].
    pub fn decode(&self, response: &BatchResponse) -> DecodedBatch {
        let mut decoded = DecodedBatch::default();

        for (index, entry) in response.entries.iter().enumerate() {
            self.decode_entry(index, entry, &mut decoded);
        }

        self.attribute_unlabelled_failure(&mut decoded);

        // Operations with no slot in the reply still get a (valid, empty) result
        for op in self.operations {
            if !decoded.contains(&op.label) {
                debug!("[BATCH_DECODE] No result for '{}', using empty RowSet", op.label);
                decoded.sets.push(RowSet::empty(op.label.clone()));
            }
        }

        debug!(
            "[BATCH_DECODE] Decoded {} entries into {} RowSets ({} failures)",
            response.len(),
            decoded.len(),
            decoded.failures.len()
        );
        decoded
    }

    fn decode_entry(&self, index: usize, entry: &BatchEntry, out: &mut DecodedBatch) {
        let hint = entry.label.clone();

        let payload: JsonValue = match serde_json::from_str(&entry.payload) {
            Ok(value) => value,
            Err(e) => return out.fail(index, hint, DecodeError::InvalidPayload(e)),
        };

        let object = match payload {
            JsonValue::Object(map) => map,
            other => {
                return out.fail(
                    index,
                    hint,
                    DecodeError::NotAnObject {
                        found: json_kind(&other),
                    },
                )
            },
        };

        let datasets = match self.locate_datasets(hint.as_deref(), &object, out) {
            Ok(datasets) => datasets,
            Err(e) => return out.fail(index, hint, e),
        };

        for (label, key) in datasets {
            match table_data(&key, &object[key.as_str()]) {
                Ok(data) => out.insert(data.into_row_set(label)),
                Err(e) => out.fail(index, Some(label), e),
            }
        }
    }

    /// A lone unlabelled failure belongs to the lone operation left without a result.
    fn attribute_unlabelled_failure(&self, decoded: &mut DecodedBatch) {
        let mut unresolved = self.operations.iter().filter(|op| !decoded.contains(&op.label));
        let op = match (unresolved.next(), unresolved.next()) {
            (Some(op), None) => op,
            _ => return,
        };

        let mut unlabelled = decoded.failures.iter_mut().filter(|f| f.label.is_none());
        if let (Some(failure), None) = (unlabelled.next(), unlabelled.next()) {
            debug!(
                "[BATCH_DECODE] Attributing failed entry {} to '{}'",
                failure.entry_index, op.label
            );
            failure.label = Some(op.label.clone());
        }
    }

    /// Map payload keys to labels; returns `(label, key)` pairs.
    fn locate_datasets(
        &self,
        hint: Option<&str>,
        object: &Map<String, JsonValue>,
        out: &DecodedBatch,
    ) -> Result<Vec<(String, String)>, DecodeError> {
        if let Some(label) = hint {
            if object.contains_key(label) {
                return Ok(vec![(label.to_string(), label.to_string())]);
            }
        }

        let mut found: Vec<(String, String)> = Vec::new();
        for key in object.keys() {
            if self.operations.iter().any(|op| &op.label == key) {
                found.push((key.clone(), key.clone()));
            }
        }
        for key in object.keys() {
            if found.iter().any(|(_, k)| k == key) {
                continue;
            }
            let taken = |label: &str| out.contains(label) || found.iter().any(|(l, _)| l == label);
            let candidates = self.operations.iter().filter(|op| &op.resource == key);
            let chosen = candidates
                .clone()
                .find(|op| Some(op.label.as_str()) == hint && !taken(&op.label))
                .or_else(|| candidates.clone().find(|op| !taken(&op.label)));
            if let Some(op) = chosen {
                found.push((op.label.clone(), key.clone()));
            }
        }
        if !found.is_empty() {
            return Ok(found);
        }

        if object.len() == 1 {
            if let Some(key) = object.keys().next() {
                let label = match hint {
                    Some(label) => label.to_string(),
                    None => self
                        .operations
                        .iter()
                        .find(|op| !out.contains(&op.label))
                        .map(|op| op.label.clone())
                        .unwrap_or_else(|| key.clone()),
                };
                return Ok(vec![(label, key.clone())]);
            }
        }

        // Without batch context, any key carrying TableData names its own dataset
        if self.operations.is_empty() && hint.is_none() {
            let keyed: Vec<(String, String)> = object
                .iter()
                .filter(|(_, value)| value.get(TABLE_DATA_KEY).is_some())
                .map(|(key, _)| (key.clone(), key.clone()))
                .collect();
            if !keyed.is_empty() {
                return Ok(keyed);
            }
        }

        Err(DecodeError::UnresolvedDataset {
            keys: object.keys().cloned().collect(),
        })
    }
}

/// Decode with no batch context.
pub fn decode(response: &BatchResponse) -> DecodedBatch {
    ResponseDecoder::new().decode(response)
}

fn table_data(dataset: &str, value: &JsonValue) -> Result<TableData, DecodeError> {
    let missing = || DecodeError::MissingTableData {
        dataset: dataset.to_string(),
    };

    let rows = match value.as_object().and_then(|obj| obj.get(TABLE_DATA_KEY)) {
        Some(JsonValue::Array(rows)) => rows,
        Some(JsonValue::Null) => return Ok(TableData::Empty { message: None }),
        _ => return Err(missing()),
    };

    let mut parsed = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match row {
            JsonValue::Object(map) => parsed.push(Row::from(map.clone())),
            _ => {
                return Err(DecodeError::RowNotObject {
                    dataset: dataset.to_string(),
                    index,
                })
            },
        }
    }
    Ok(TableData::from_rows(parsed))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::BatchComposer;
    use serde_json::json;

    fn entry(payload: JsonValue) -> BatchEntry {
        BatchEntry::new(payload.to_string())
    }

    fn response(entries: Vec<BatchEntry>) -> BatchResponse {
        BatchResponse { entries }
    }

    #[test]
    fn test_decodes_label_keyed_payload() {
        let resp = response(vec![entry(json!({
            "Company": { "TableData": [ { "companyId": 1 }, { "companyId": 2 } ] }
        }))]);

        let decoded = decode(&resp);
        assert!(decoded.is_clean());
        assert_eq!(decoded.rows("Company").len(), 2);
    }

    #[test]
    fn test_sentinel_only_payload_is_empty() {
        let resp = response(vec![entry(json!({
            "Company": { "TableData": [ { "Message": "No data found" } ] }
        }))]);

        let decoded = decode(&resp);
        let set = decoded.row_set("Company").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.notice.as_deref(), Some("No data found"));
        assert!(decoded.is_clean());
    }

    #[test]
    fn test_resource_named_payload_maps_to_label() {
        let batch = BatchComposer::new()
            .read_exact("Managers", "employee", [("employeeRole", "manager")])
            .build()
            .unwrap();
        let resp = response(vec![entry(json!({
            "employee": { "TableData": [ { "employeeId": 4 } ] }
        }))]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert_eq!(decoded.rows("Managers").len(), 1);
        assert!(!decoded.contains("employee"));
    }

    #[test]
    fn test_echoed_label_with_single_unknown_key() {
        let resp = response(vec![BatchEntry::labelled(
            "Stats",
            json!({ "Table1": { "TableData": [ { "total": 3 } ] } }).to_string(),
        )]);

        let decoded = decode(&resp);
        assert_eq!(decoded.rows("Stats").len(), 1);
    }

    #[test]
    fn test_multiple_unknown_keys_with_batch_context_fail() {
        let batch = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 1)])
            .build()
            .unwrap();
        let resp = response(vec![entry(json!({
            "a": { "TableData": [] },
            "b": { "TableData": [] }
        }))]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert_eq!(decoded.failures().len(), 1);
        assert!(matches!(
            decoded.failures()[0].error,
            DecodeError::UnresolvedDataset { .. }
        ));
        // The expected label is still present, empty
        assert!(decoded.row_set("Company").unwrap().is_empty());
        assert_eq!(decoded.failures()[0].label.as_deref(), Some("Company"));
    }

    #[test]
    fn test_single_unknown_key_fills_only_operation() {
        let batch = BatchComposer::new()
            .procedure("Stats", "usp_GetStats", [("year", 2024)])
            .build()
            .unwrap();
        let resp = response(vec![entry(json!({
            "Table": { "TableData": [ { "total": 3 } ] }
        }))]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert!(decoded.is_clean());
        assert_eq!(decoded.rows("Stats").len(), 1);
        assert!(!decoded.contains("Table"));
        assert_eq!(decoded.labels().collect::<Vec<_>>(), vec!["Stats"]);
    }

    #[test]
    fn test_single_unknown_keys_fill_operations_in_batch_order() {
        let batch = BatchComposer::new()
            .procedure("Totals", "usp_Totals", [("year", 2024)])
            .procedure("Recent", "usp_Recent", [("days", 7)])
            .build()
            .unwrap();
        let resp = response(vec![
            entry(json!({ "Table": { "TableData": [ { "total": 3 } ] } })),
            entry(json!({ "Table": { "TableData": [ { "id": 1 }, { "id": 2 } ] } })),
        ]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert!(decoded.is_clean());
        assert_eq!(decoded.rows("Totals").len(), 1);
        assert_eq!(decoded.rows("Recent").len(), 2);
    }

    #[test]
    fn test_unparseable_entry_charged_to_remaining_operation() {
        let batch = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 1)])
            .read_in("Links", "link", "linkCompanyId", [1])
            .build()
            .unwrap();
        let resp = response(vec![
            entry(json!({ "Company": { "TableData": [ { "companyId": 1 } ] } })),
            BatchEntry::new("{not json"),
        ]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert_eq!(decoded.failures().len(), 1);
        assert_eq!(decoded.failures()[0].entry_index, 1);
        assert_eq!(decoded.failures()[0].label.as_deref(), Some("Links"));
        assert!(decoded.rows("Links").is_empty());
        assert_eq!(decoded.rows("Company").len(), 1);
    }

    #[test]
    fn test_unparseable_entry_stays_unlabelled_when_ambiguous() {
        let batch = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 1)])
            .read_in("Links", "link", "linkCompanyId", [1])
            .build()
            .unwrap();
        let resp = response(vec![BatchEntry::new("{not json")]);

        let decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert_eq!(decoded.failures().len(), 1);
        assert!(decoded.failures()[0].label.is_none());
        assert!(decoded.rows("Company").is_empty());
        assert!(decoded.rows("Links").is_empty());
    }

    #[test]
    fn test_invalid_payload_is_contained() {
        let resp = response(vec![
            BatchEntry::new("{not json"),
            entry(json!({ "Company": { "TableData": [ { "companyId": 1 } ] } })),
        ]);

        let decoded = decode(&resp);
        assert_eq!(decoded.failures().len(), 1);
        assert_eq!(decoded.failures()[0].entry_index, 0);
        assert!(matches!(decoded.failures()[0].error, DecodeError::InvalidPayload(_)));
        assert_eq!(decoded.rows("Company").len(), 1);
    }

    #[test]
    fn test_missing_table_data_keeps_label_empty() {
        let resp = response(vec![entry(json!({ "Company": { "Rows": [] } }))]);

        let decoded = decode(&resp);
        assert!(decoded.contains("Company"));
        assert!(decoded.rows("Company").is_empty());
        assert_eq!(decoded.failures()[0].label.as_deref(), Some("Company"));
    }

    #[test]
    fn test_non_object_payload_and_rows() {
        let resp = response(vec![
            BatchEntry::labelled("List", "[1,2,3]"),
            entry(json!({ "Bad": { "TableData": [ 1 ] } })),
        ]);

        let decoded = decode(&resp);
        assert_eq!(decoded.failures().len(), 2);
        assert!(matches!(
            decoded.failures()[0].error,
            DecodeError::NotAnObject { found: "array" }
        ));
        assert!(matches!(
            decoded.failures()[1].error,
            DecodeError::RowNotObject { index: 0, .. }
        ));
        assert!(decoded.rows("List").is_empty());
        assert!(decoded.rows("Bad").is_empty());
    }

    #[test]
    fn test_absent_operation_gets_empty_row_set() {
        let batch = BatchComposer::new()
            .read_exact("Company", "company", [("companyId", 1)])
            .read_in("Links", "link", "linkCompanyId", [1])
            .build()
            .unwrap();
        let resp = response(vec![entry(json!({
            "Company": { "TableData": [ { "companyId": 1 } ] }
        }))]);

        let mut decoded = ResponseDecoder::for_batch(&batch).decode(&resp);
        assert_eq!(decoded.len(), 2);
        assert!(decoded.is_clean());
        assert!(decoded.take("Links").is_empty());
        assert!(!decoded.contains("Links"));
        assert_eq!(decoded.take("Company").len(), 1);
    }

    #[test]
    fn test_null_table_data_is_empty() {
        let resp = response(vec![entry(json!({ "Company": { "TableData": null } }))]);
        let decoded = decode(&resp);
        assert!(decoded.is_clean());
        assert!(decoded.rows("Company").is_empty());
    }

    #[test]
    fn test_repeated_dataset_rows_are_merged() {
        let resp = response(vec![
            entry(json!({ "Company": { "TableData": [ { "Message": "No data found" } ] } })),
            entry(json!({ "Company": { "TableData": [ { "companyId": 1 } ] } })),
        ]);

        let decoded = decode(&resp);
        let set = decoded.row_set("Company").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.notice, None);
    }
}
