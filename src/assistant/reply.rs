//! Reading the classification reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The four things a chat message can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Create,
    Read,
    Update,
    Delete,
}

impl Intent {
    /// Whether handling this intent may change stored tasks.
    pub fn mutates(&self) -> bool {
        !matches!(self, Intent::Read)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Intent::Create => "CREATE",
            Intent::Read => "READ",
            Intent::Update => "UPDATE",
            Intent::Delete => "DELETE",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default, alias = "todos")]
    tasks: Option<Vec<Value>>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    conditions: Option<Map<String, Value>>,
    #[serde(default)]
    updates: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    action: Intent,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RawData>,
}

/// Intent-specific part of a reply. Conditions and updates stay untyped here;
/// they are checked against the closed vocabularies when dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Create { items: Vec<Value> },
    Read { query: Option<String> },
    Update { conditions: Map<String, Value>, updates: Map<String, Value> },
    Delete { conditions: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub intent: Intent,
    pub message: String,
    pub payload: Payload,
}

/// The text from the first `{` to the last `}`, if there is such a span.
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parses a model reply. `None` when no JSON object with a known `action` can be read.
pub fn parse_reply(raw: &str) -> Option<ModelReply> {
    let reply: RawReply = serde_json::from_str(extract_json(raw)?).ok()?;
    let data = reply.data.unwrap_or_default();

    let payload = match reply.action {
        Intent::Create => Payload::Create {
            items: data.tasks.unwrap_or_default(),
        },
        Intent::Read => Payload::Read { query: data.query },
        Intent::Update => Payload::Update {
            conditions: data.conditions.unwrap_or_default(),
            updates: data.updates.unwrap_or_default(),
        },
        Intent::Delete => Payload::Delete {
            conditions: data.conditions.unwrap_or_default(),
        },
    };

    Some(ModelReply {
        intent: reply.action,
        message: reply.message.unwrap_or_default(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_spans_first_to_last_brace() {
        let raw = "Sure! Here you go:\n```json\n{\"action\": \"READ\", \"data\": {}}\n```";
        assert_eq!(extract_json(raw), Some("{\"action\": \"READ\", \"data\": {}}"));
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_parse_update_reply() {
        let raw = r#"{"action":"UPDATE","data":{"conditions":{"title":"운동","completed":false},"updates":{"completed":true}},"message":"운동이 완료되었습니다!"}"#;
        let reply = parse_reply(raw).unwrap();

        assert_eq!(reply.intent, Intent::Update);
        assert_eq!(reply.message, "운동이 완료되었습니다!");
        match reply.payload {
            Payload::Update { conditions, updates } => {
                assert_eq!(conditions["title"], json!("운동"));
                assert_eq!(updates["completed"], json!(true));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_accepts_todos_alias() {
        let raw = r#"{"action":"CREATE","data":{"todos":[{"title":"밥먹기"}]},"message":"ok"}"#;
        match parse_reply(raw).unwrap().payload {
            Payload::Create { items } => assert_eq!(items.len(), 1),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_or_broken_json_is_unparsed() {
        assert!(parse_reply(r#"{"action":"LIST","data":{}}"#).is_none());
        assert!(parse_reply(r#"{"action": "READ", "data": "#).is_none());
        assert!(parse_reply("I think you should rest today.").is_none());
    }

    #[test]
    fn test_missing_data_defaults() {
        let reply = parse_reply(r#"{"action":"DELETE"}"#).unwrap();
        assert_eq!(reply.message, "");
        assert_eq!(reply.payload, Payload::Delete { conditions: Map::new() });
    }

    #[test]
    fn test_intent_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Intent::Create).unwrap(), json!("CREATE"));
        assert!(Intent::Delete.mutates());
        assert!(!Intent::Read.mutates());
    }
}
