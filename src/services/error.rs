// src/services/error.rs
use thiserror::Error;

/// Everything that can go wrong talking to the dashboard backend.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    MissingData(String),
}

impl ClientError {
    pub fn missing(message: impl Into<String>) -> Self {
        ClientError::MissingData(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_names_status_and_reason() {
        let err = ClientError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not Found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}
