use serde_json::Value as JsonValue;
use thiserror::Error;

/// Why a backend call failed. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never got an HTTP response.
    #[error("{0}")]
    Transport(String),
    /// Non-2xx status; `detail` is the server's message or a fallback.
    #[error("{detail}")]
    Server { status: u16, detail: String },
    #[error("unexpected response from server: {0}")]
    Decode(String),
    #[error("could not build request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        ApiError::Server {
            status,
            detail: server_detail(status, body),
        }
    }
}

/// Extract a readable message from an error body.
///
/// FastAPI-style bodies carry `detail`, either a string or a list of
/// validation entries; list entries are joined one per line.
pub fn server_detail(status: u16, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    let text = match detail {
        Some(JsonValue::String(s)) => s,
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(detail_entry)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    if text.trim().is_empty() {
        format!("Request failed with status {status}")
    } else {
        text
    }
}

fn detail_entry(item: &JsonValue) -> String {
    match item {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(obj) => match obj.get("msg") {
            Some(JsonValue::String(msg)) => msg.clone(),
            _ => item.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn string_detail_is_used_verbatim() {
        let body = br#"{"detail": "Formula not found"}"#;
        assert_eq!(server_detail(404, body), "Formula not found");
        assert_eq!(ApiError::from_status(404, body).to_string(), "Formula not found");
    }

    #[test]
    fn array_detail_is_joined() {
        let body = br#"{"detail": [
            {"loc": ["body", "name"], "msg": "field required", "type": "value_error.missing"},
            "second problem"
        ]}"#;
        assert_eq!(server_detail(422, body), "field required\nsecond problem");
    }

    #[test]
    fn missing_detail_falls_back_to_status() {
        assert_eq!(server_detail(500, b"Internal Server Error"), "Request failed with status 500");
        assert_eq!(server_detail(502, br#"{"detail": null}"#), "Request failed with status 502");
        assert_eq!(server_detail(400, br#"{"detail": {"code": 7}}"#), r#"{"code":7}"#);
    }
}
