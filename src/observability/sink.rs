//! Per-command observability records.
//!
//! Sessions do not log commands directly; they hand a [`CommandRecord`] to an
//! injected [`CommandSink`]. Production uses [`TracingSink`], tests capture.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::classify::ClassifiedField;
use crate::net::ConnectionId;

/// One decoded request, as seen by observability.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommandRecord {
    pub connection_id: ConnectionId,
    /// Command name as sent by the client.
    pub command: String,
    /// Classified fields, in classifier order.
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<ClassifiedField>,
}

impl CommandRecord {
    /// Look up a field's value by name.
    pub fn field(&self, name: &str) -> Option<&crate::classify::FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Fields rendered as an ordered JSON object.
    pub fn fields_json(&self) -> String {
        serde_json::to_string(&FieldMap(&self.fields)).unwrap_or_default()
    }
}

/// Receives one record per decoded request.
pub trait CommandSink: Send + Sync {
    fn record(&self, record: &CommandRecord);
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl CommandSink for TracingSink {
    fn record(&self, record: &CommandRecord) {
        tracing::info!(
            connection_id = %record.connection_id,
            command = %record.command,
            fields = %record.fields_json(),
            "Received command"
        );
    }
}

/// Serializes fields as a map, keeping their order.
struct FieldMap<'a>(&'a [ClassifiedField]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(field.name, &field.value)?;
        }
        map.end()
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_fields<S: Serializer>(
    fields: &Vec<ClassifiedField>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    FieldMap(fields).serialize(serializer)
}
