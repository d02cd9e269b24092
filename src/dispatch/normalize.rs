use serde_json::Value;

use crate::clash::ApiResponse;

/// Anything that may carry an underlying raw JSON payload.
pub trait RawPayload {
    /// The raw body behind a decoded response, when there is one.
    fn raw_data(&self) -> Option<&Value> {
        None
    }

    /// The value itself, used when no raw body is exposed.
    fn as_value(&self) -> Option<&Value>;
}

impl RawPayload for Value {
    fn as_value(&self) -> Option<&Value> {
        Some(self)
    }
}

impl<T> RawPayload for ApiResponse<T> {
    fn raw_data(&self) -> Option<&Value> {
        Some(&self.raw_data)
    }

    fn as_value(&self) -> Option<&Value> {
        None
    }
}

impl<P: RawPayload> RawPayload for Option<P> {
    fn raw_data(&self) -> Option<&Value> {
        self.as_ref().and_then(RawPayload::raw_data)
    }

    fn as_value(&self) -> Option<&Value> {
        self.as_ref().and_then(RawPayload::as_value)
    }
}

/// Reduce a response to a plain ordered list of items.
///
/// An `{"items": [...]}` envelope wins over the bare-list check, since some
/// list-like payloads arrive wrapped in an object.
pub fn normalize<P: RawPayload + ?Sized>(response: &P) -> Vec<Value> {
    let raw = match response.raw_data().or_else(|| response.as_value()) {
        Some(raw) => raw,
        None => return Vec::new(),
    };

    if let Some(items) = raw.as_object().and_then(|map| map.get("items")) {
        return match items {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => coerce(other),
        };
    }

    match raw {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

/// Best-effort list view of a non-array `items` value. Objects iterate their
/// keys and strings their characters; numbers and bools stand alone.
fn coerce(items: &Value) -> Vec<Value> {
    match items {
        Value::Object(map) => map.keys().cloned().map(Value::String).collect(),
        Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
        other => vec![other.clone()],
    }
}
