#![allow(dead_code)]
//! In-memory backend for exercising the client without a server.
//!
//! Serves `readExact` / `readIn` from tables keyed by resource name,
//! `procedure` from canned results, honors `PageNo` / `NoOfLines`, and
//! answers empty results with the `{ "Message": "No data found" }` sentinel.

use async_trait::async_trait;
use batch_link::models::key_string;
use batch_link::{
    ActionKind, BatchEntry, BatchLinkClient, BatchRequest, BatchResponse, OperationDescriptor,
    Transport, TransportError,
};
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NO_DATA: &str = "No data found";

#[derive(Default)]
pub struct FakeTransport {
    tables: HashMap<String, Vec<JsonValue>>,
    procedures: HashMap<String, Vec<JsonValue>>,
    key_by_resource: bool,
    malformed: HashSet<String>,
    omitted: HashSet<String>,
    failure: Option<(u16, String)>,
    delays: Mutex<VecDeque<Duration>>,
    requests: Mutex<Vec<BatchRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, resource: &str, rows: Vec<JsonValue>) -> Self {
        self.tables.insert(resource.to_string(), rows);
        self
    }

    pub fn with_procedure(mut self, name: &str, rows: Vec<JsonValue>) -> Self {
        self.procedures.insert(name.to_string(), rows);
        self
    }

    /// Name each payload after the resource instead of the caller's label
    pub fn keyed_by_resource(mut self) -> Self {
        self.key_by_resource = true;
        self
    }

    /// Return unparseable `JsonData` for this label
    pub fn malformed_label(mut self, label: &str) -> Self {
        self.malformed.insert(label.to_string());
        self
    }

    /// Leave this label out of the reply entirely
    pub fn omit_label(mut self, label: &str) -> Self {
        self.omitted.insert(label.to_string());
        self
    }

    pub fn failing(mut self, status_code: u16, message: &str) -> Self {
        self.failure = Some((status_code, message.to_string()));
        self
    }

    /// Per-call latency, consumed in call order
    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn select(&self, op: &OperationDescriptor) -> Vec<JsonValue> {
        match op.action {
            ActionKind::ReadExact => self
                .table(&op.resource)
                .filter(|row| {
                    op.fields
                        .iter()
                        .all(|(field, value)| field_key(row, field).as_deref() == Some(value.as_str()))
                })
                .collect(),
            ActionKind::ReadIn => self
                .table(&op.resource)
                .filter(|row| {
                    op.fields.iter().all(|(field, list)| {
                        let wanted = parse_id_list(list);
                        field_key(row, field).map(|k| wanted.contains(&k)).unwrap_or(false)
                    })
                })
                .collect(),
            ActionKind::Procedure => self.procedures.get(&op.resource).cloned().unwrap_or_default(),
            ActionKind::Create | ActionKind::Update | ActionKind::Delete => {
                vec![json!({ "affectedRows": 1 })]
            },
        }
    }

    fn table(&self, resource: &str) -> impl Iterator<Item = JsonValue> + '_ {
        self.tables.get(resource).into_iter().flatten().cloned()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((status_code, message)) = &self.failure {
            return Err(TransportError::Status {
                status_code: *status_code,
                message: message.clone(),
            });
        }

        let operations = request.operations().map_err(TransportError::MalformedResponse)?;
        let (page_no, page_size) = request.page().unwrap_or((1, u32::MAX));
        let offset = (page_no.saturating_sub(1) as usize).saturating_mul(page_size as usize);

        let mut entries = Vec::new();
        for op in &operations {
            if self.omitted.contains(&op.label) {
                continue;
            }
            let key = if self.key_by_resource { &op.resource } else { &op.label };
            if self.malformed.contains(&op.label) {
                entries.push(BatchEntry::new(format!("{{\"{}\": {{\"TableData\": [", key)));
                continue;
            }

            let mut rows: Vec<JsonValue> = self
                .select(op)
                .into_iter()
                .skip(offset)
                .take(page_size as usize)
                .collect();
            if rows.is_empty() {
                rows.push(json!({ "Message": NO_DATA }));
            }
            let payload = json!({ key.as_str(): { "TableData": rows } });
            entries.push(BatchEntry::new(payload.to_string()));
        }

        Ok(BatchResponse { entries })
    }
}

fn field_key(row: &JsonValue, field: &str) -> Option<String> {
    row.get(field).and_then(key_string)
}

fn parse_id_list(list: &str) -> HashSet<String> {
    list.trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

pub fn client_with(transport: Arc<FakeTransport>) -> BatchLinkClient {
    BatchLinkClient::builder()
        .transport(transport)
        .bearer_token("test-token")
        .build()
        .expect("client with fake transport should build")
}

pub fn parents_and_children() -> FakeTransport {
    FakeTransport::new()
        .with_table(
            "parent",
            vec![
                json!({ "parentId": 1, "parentName": "Alpha", "parentActive": 1 }),
                json!({ "parentId": 2, "parentName": "Beta", "parentActive": 1 }),
                json!({ "parentId": 3, "parentName": "Gamma", "parentActive": 1 }),
                json!({ "parentId": 4, "parentName": "Retired", "parentActive": 0 }),
            ],
        )
        .with_table(
            "child",
            vec![
                json!({ "childId": 10, "childParentId": "1" }),
                json!({ "childId": 11, "childParentId": "1" }),
                json!({ "childId": 12, "childParentId": "2" }),
                json!({ "childId": 13, "childParentId": "3" }),
                json!({ "childId": 14, "childParentId": "3" }),
                json!({ "childId": 15, "childParentId": "4" }),
            ],
        )
}
