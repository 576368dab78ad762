//! Typed envelope for server-push events.

use super::sse::SseFrame;
use serde_json::Value;
use std::fmt;

/// What changed on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The product list changed
    ProductsChanged,
    /// A user's profile changed
    ProfileChanged,
    /// Any other event name
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "products_changed" => Self::ProductsChanged,
            "profile_changed" => Self::ProfileChanged,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ProductsChanged => "products_changed",
            Self::ProfileChanged => "profile_changed",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded push event: `{type, entityId, payload}`.
///
/// The channel is shared by several kinds of events, so subscribers match on
/// `kind` and `entity_id` instead of inspecting raw payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    pub kind: EventKind,
    /// Id of the affected entity, when the server named one
    pub entity_id: Option<i64>,
    pub payload: Value,
}

impl LiveEvent {
    pub fn new(kind: EventKind, entity_id: Option<i64>, payload: Value) -> Self {
        Self {
            kind,
            entity_id,
            payload,
        }
    }

    /// Decode a frame.
    ///
    /// Data carrying a `type` field is read as the envelope itself. Anything
    /// else takes its kind from the SSE event name and its entity id from
    /// `userId`, `productId` or `id` in the data. Unparseable data decodes
    /// with a `null` payload and no entity id.
    pub fn from_frame(frame: &SseFrame) -> Self {
        let data: Value = serde_json::from_str(&frame.data).unwrap_or(Value::Null);

        if let Some(kind) = data.get("type").and_then(Value::as_str) {
            return Self {
                kind: EventKind::from_name(kind),
                entity_id: data.get("entityId").and_then(id_value),
                payload: data.get("payload").cloned().unwrap_or(Value::Null),
            };
        }

        let entity_id = ["userId", "productId", "id"]
            .iter()
            .find_map(|key| data.get(*key).and_then(id_value));

        Self {
            kind: EventKind::from_name(&frame.event),
            entity_id,
            payload: data,
        }
    }

    /// True when the event names exactly this entity.
    pub fn concerns(&self, kind: &EventKind, entity_id: i64) -> bool {
        &self.kind == kind && self.entity_id == Some(entity_id)
    }
}

// Ids arrive as numbers, occasionally as numeric strings.
fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
