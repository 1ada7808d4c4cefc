use crate::error::{Result, ViewerError};
use crate::time::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub const KEY_MODULE: &str = "module";
pub const KEY_MESSAGE: &str = "msg";
pub const KEY_LEVEL: &str = "lvl";
pub const KEY_TIME: &str = "t";
pub const KEY_CALLER: &str = "caller";
pub const KEY_NODE: &str = "node";

/// One normalised log event.
///
/// Every key of the source object that is not a canonical field is kept
/// untouched in `extra`; `body` is the source line itself and is what
/// message patterns are matched against.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub id: String,
    pub module: String,
    pub message: String,
    pub level: String,
    pub t: Timestamp,
    pub node: Option<String>,
    pub caller: String,
    pub extra: Map<String, Value>,
    pub body: String,
}

/// Canonical fields only, for the detail panel next to `extra`
#[derive(Debug, Clone, Serialize)]
pub struct RecordBasic<'a> {
    pub t: &'a Timestamp,
    pub module: &'a str,
    pub message: &'a str,
    pub level: &'a str,
    pub node: Option<&'a str>,
    pub caller: &'a str,
    pub body: &'a str,
}

impl LogRecord {
    /// Parse one JSON log line.
    ///
    /// `Ok(None)` means the line is not a JSON object at all and should be
    /// skipped. A JSON object that lacks a canonical field, or whose `t` is
    /// not a valid timestamp, is an error naming the problem.
    pub fn from_json(line: &str) -> Result<Option<Self>> {
        let mut obj = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(obj)) => obj,
            Ok(other) => {
                log::warn!("log line is not a JSON object: {}", kind_of(&other));
                return Ok(None);
            }
            Err(e) => {
                log::warn!("malformed log line: {}", e);
                return Ok(None);
            }
        };

        let module = take_text(&mut obj, KEY_MODULE).ok_or(ViewerError::MissingField("module"))?;
        let message = take_text(&mut obj, KEY_MESSAGE).ok_or(ViewerError::MissingField("message"))?;
        let level = take_text(&mut obj, KEY_LEVEL).ok_or(ViewerError::MissingField("level"))?;

        let t = match obj.remove(KEY_TIME) {
            Some(Value::String(s)) => Timestamp::parse(&s)?,
            Some(Value::Null) | None => return Err(ViewerError::MissingField("t")),
            Some(other) => return Err(ViewerError::InvalidTime(other.to_string())),
        };

        let node = take_text(&mut obj, KEY_NODE);
        let caller = take_text(&mut obj, KEY_CALLER).ok_or(ViewerError::MissingField("caller"))?;

        Ok(Some(Self {
            id: format!("{}-{}", t.nanos(), Uuid::new_v4()),
            module,
            message,
            level,
            t,
            node,
            caller,
            extra: obj,
            body: line.to_string(),
        }))
    }

    pub fn basic(&self) -> RecordBasic<'_> {
        RecordBasic {
            t: &self.t,
            module: &self.module,
            message: &self.message,
            level: &self.level,
            node: self.node.as_deref(),
            caller: &self.caller,
            body: &self.body,
        }
    }

    /// Full JSON representation, as handed to exporters
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Remove `key` and render it as text. Strings are taken as-is, other JSON
/// values as their JSON text; `null` counts as absent.
fn take_text(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
