use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Read,
    Increment,
}

impl CounterAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Increment => "increment",
        }
    }
}

/// Returns `requestContext.http.method`, or an empty string when any segment
/// of that path is missing or not of the expected shape.
pub fn extract_method(event: &Value) -> &str {
    event
        .get("requestContext")
        .and_then(|context| context.get("http"))
        .and_then(|http| http.get("method"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Only `POST` (any case) increments; everything else falls back to a read.
pub fn action_for_method(method: &str) -> CounterAction {
    if method.eq_ignore_ascii_case("POST") {
        CounterAction::Increment
    } else {
        CounterAction::Read
    }
}

pub fn action_for_event(event: &Value) -> CounterAction {
    action_for_method(extract_method(event))
}
