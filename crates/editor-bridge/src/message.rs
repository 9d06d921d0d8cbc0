//! Tagged envelope exchanged between the probe and the caller.
//!
//! The page bus is shared with arbitrary page scripts, so every message the
//! probe posts carries `source: "codepost-editor-bridge"` and the listener
//! ignores anything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::window::{MessageOrigin, WindowMessage};

/// Source tag carried by every probe message.
pub const BRIDGE_SOURCE: &str = "codepost-editor-bridge";

const UNKNOWN_ERROR: &str = "unknown error fetching code";

/// Wire form of a probe message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEnvelope {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeEnvelope {
    pub fn editor_value(value: impl Into<String>) -> Self {
        BridgeEnvelope {
            source: BRIDGE_SOURCE.to_string(),
            editor_value: Some(value.into()),
            error: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        BridgeEnvelope {
            source: BRIDGE_SOURCE.to_string(),
            editor_value: None,
            error: Some(reason.into()),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// What the caller learned from one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeReply {
    EditorValue(String),
    Error(String),
}

/// Interpret a bus message, or `None` if the listener should ignore it.
///
/// Accepted: same-window messages whose JSON object carries our source tag.
/// `editorValue` wins over `error` when both are present.
pub fn parse_reply(message: &WindowMessage) -> Option<BridgeReply> {
    if message.origin != MessageOrigin::SameWindow || !message.data.is_object() {
        return None;
    }

    let envelope: BridgeEnvelope = serde_json::from_value(message.data.clone()).ok()?;
    if envelope.source != BRIDGE_SOURCE {
        return None;
    }

    match (envelope.editor_value, envelope.error) {
        (Some(code), _) => Some(BridgeReply::EditorValue(code)),
        (None, Some(reason)) => Some(BridgeReply::Error(reason)),
        (None, None) => Some(BridgeReply::Error(UNKNOWN_ERROR.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn same(data: Value) -> WindowMessage {
        WindowMessage {
            origin: MessageOrigin::SameWindow,
            data,
        }
    }

    #[test]
    fn test_envelope_wire_format() {
        let json = BridgeEnvelope::editor_value("x = 1").to_json();
        assert_eq!(
            json,
            json!({"source": "codepost-editor-bridge", "editorValue": "x = 1"})
        );

        let json = BridgeEnvelope::error("boom").to_json();
        assert_eq!(json, json!({"source": "codepost-editor-bridge", "error": "boom"}));
    }

    #[test]
    fn test_accepts_tagged_value() {
        let reply = parse_reply(&same(BridgeEnvelope::editor_value("code").to_json()));
        assert_eq!(reply, Some(BridgeReply::EditorValue("code".to_string())));
    }

    #[test]
    fn test_empty_editor_value_is_still_a_value() {
        let reply = parse_reply(&same(BridgeEnvelope::editor_value("").to_json()));
        assert_eq!(reply, Some(BridgeReply::EditorValue(String::new())));
    }

    #[test]
    fn test_ignores_foreign_origin() {
        let msg = WindowMessage {
            origin: MessageOrigin::Foreign,
            data: BridgeEnvelope::editor_value("code").to_json(),
        };
        assert_eq!(parse_reply(&msg), None);
    }

    #[test]
    fn test_ignores_other_sources_and_non_objects() {
        assert_eq!(
            parse_reply(&same(json!({"source": "devtools", "editorValue": "x"}))),
            None
        );
        assert_eq!(parse_reply(&same(json!("codepost-editor-bridge"))), None);
        assert_eq!(parse_reply(&same(json!({"editorValue": "x"}))), None);
    }

    #[test]
    fn test_tagged_message_without_fields_is_an_error() {
        let reply = parse_reply(&same(json!({"source": BRIDGE_SOURCE})));
        assert_eq!(reply, Some(BridgeReply::Error(UNKNOWN_ERROR.to_string())));
    }
}
