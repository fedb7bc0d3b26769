//! Panel protocol: JSON messages exchanged with an editor panel, one per line.

use crate::interpret::GenerationResult;
use crate::mode::Mode;
use crate::snippet::EMPTY_SLOT_WARNING;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Messages sent by the panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    #[serde(rename = "generate")]
    Generate {
        mode: Mode,
        #[serde(default, deserialize_with = "null_as_empty")]
        text: String,
        #[serde(default)]
        context: Option<String>,
    },
    #[serde(rename = "insertLast")]
    InsertLast,
}

/// Messages sent to the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "result")]
    Result(ResultPayload),
    /// Snippet for the host to insert at the cursor.
    #[serde(rename = "insert")]
    Insert { text: String },
    #[serde(rename = "warning")]
    Warning { message: String },
}

/// `{ok:true, json}`, `{ok:true, text}` or `{ok:false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPayload {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outbound {
    pub fn from_result(result: &GenerationResult) -> Self {
        let payload = match result {
            GenerationResult::Structured(map) => ResultPayload {
                ok: true,
                json: Some(Value::Object(map.clone())),
                text: None,
                error: None,
            },
            GenerationResult::Raw(text) => ResultPayload {
                ok: true,
                json: None,
                text: Some(text.clone()),
                error: None,
            },
        };
        Outbound::Result(payload)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outbound::Result(ResultPayload {
            ok: false,
            json: None,
            text: None,
            error: Some(message.into()),
        })
    }

    pub fn insert_or_warn(snippet: Option<&str>) -> Self {
        match snippet {
            Some(text) => Outbound::Insert {
                text: text.to_string(),
            },
            None => Outbound::Warning {
                message: EMPTY_SLOT_WARNING.to_string(),
            },
        }
    }
}

/// `null` reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn parse_inbound(line: &str) -> Result<Inbound, serde_json::Error> {
    serde_json::from_str(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_generate() {
        let msg = parse_inbound(
            r#"{"type":"generate","mode":"debug","text":"NullReferenceException","context":"void Update() {}"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            Inbound::Generate {
                mode: Mode::Debug,
                text: "NullReferenceException".to_string(),
                context: Some("void Update() {}".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_generate_defaults() {
        let msg = parse_inbound(r#"{"type":"generate","mode":"code"}"#).unwrap();
        assert_eq!(
            msg,
            Inbound::Generate {
                mode: Mode::Code,
                text: String::new(),
                context: None,
            }
        );
    }

    #[test]
    fn test_parse_generate_null_fields() {
        let msg =
            parse_inbound(r#"{"type":"generate","mode":"code","text":null,"context":null}"#)
                .unwrap();
        assert_eq!(
            msg,
            Inbound::Generate {
                mode: Mode::Code,
                text: String::new(),
                context: None,
            }
        );
    }

    #[test]
    fn test_parse_insert_last() {
        assert_eq!(
            parse_inbound(r#"{"type":"insertLast"}"#).unwrap(),
            Inbound::InsertLast
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_mode() {
        assert!(parse_inbound(r#"{"type":"delete"}"#).is_err());
        assert!(parse_inbound(r#"{"type":"generate","mode":"refactor"}"#).is_err());
        assert!(parse_inbound("generate code").is_err());
    }

    #[test]
    fn test_structured_result_message() {
        let result = GenerationResult::interpret(r#"{"code":"x","explanation":"y"}"#.to_string());
        let value = serde_json::to_value(Outbound::from_result(&result)).unwrap();
        assert_eq!(
            value,
            json!({"type":"result","ok":true,"json":{"code":"x","explanation":"y"}})
        );
    }

    #[test]
    fn test_raw_result_message() {
        let result = GenerationResult::interpret("plain prose".to_string());
        let value = serde_json::to_value(Outbound::from_result(&result)).unwrap();
        assert_eq!(value, json!({"type":"result","ok":true,"text":"plain prose"}));
    }

    #[test]
    fn test_error_message() {
        let value = serde_json::to_value(Outbound::error("Gemini API Error 429")).unwrap();
        assert_eq!(
            value,
            json!({"type":"result","ok":false,"error":"Gemini API Error 429"})
        );
    }

    #[test]
    fn test_insert_and_warning_messages() {
        assert_eq!(
            serde_json::to_value(Outbound::insert_or_warn(Some("let a = 1;"))).unwrap(),
            json!({"type":"insert","text":"let a = 1;"})
        );
        assert_eq!(
            serde_json::to_value(Outbound::insert_or_warn(None)).unwrap(),
            json!({"type":"warning","message":"No snippet generated yet."})
        );
    }
}
