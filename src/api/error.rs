// src/api/error.rs
use thiserror::Error;

/// Failure of one backend call. There is deliberately no retry machinery;
/// every error surfaces once, as a toast or a blocking modal.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// The response arrived but did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn backend(status: u16, body: &str) -> Self {
        ApiError::Backend {
            status,
            message: extract_message(body)
                .unwrap_or_else(|| format!("request failed with status {status}")),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// The backend answers with either a bare string or a `{"message": ...}`
/// object; both success and failure paths use the same extraction.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => return Some(s),
            serde_json::Value::Object(map) => {
                if let Some(serde_json::Value::String(s)) = map.get("message") {
                    if !s.trim().is_empty() {
                        return Some(s.clone());
                    }
                }
                return None;
            }
            _ => return None,
        }
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_string_bodies() {
        assert_eq!(
            extract_message("Transformer already exists"),
            Some("Transformer already exists".to_string())
        );
        assert_eq!(
            extract_message(r#""Transformer already exists""#),
            Some("Transformer already exists".to_string())
        );
    }

    #[test]
    fn extracts_message_objects() {
        assert_eq!(
            extract_message(r#"{"message": "created", "id": 4}"#),
            Some("created".to_string())
        );
        assert_eq!(extract_message(r#"{"status": "ok"}"#), None);
        assert_eq!(extract_message("   "), None);
    }

    #[test]
    fn backend_error_falls_back_to_status_text() {
        let err = ApiError::backend(502, "");
        assert_eq!(err.to_string(), "request failed with status 502");
        let err = ApiError::backend(409, r#"{"message":"duplicate"}"#);
        assert_eq!(err.to_string(), "duplicate");
    }
}
