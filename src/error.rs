use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors surfaced by the chat core. Every one of them is terminal for the
/// operation that produced it.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The file extension is not one of the supported document formats
    #[error("unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },

    /// The document could not be decoded or its text extracted
    #[error("failed to parse {format} document: {cause}")]
    ParseFailure { format: String, cause: String },

    /// The language-model call did not produce an answer
    #[error("{kind} error from the language model: {cause}")]
    Transport { kind: TransportKind, cause: String },

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    pub fn parse_failure(format: impl Into<String>, cause: impl ToString) -> Self {
        Self::ParseFailure {
            format: format.into(),
            cause: cause.to_string(),
        }
    }

    pub fn transport(kind: TransportKind, cause: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            cause: cause.into(),
        }
    }
}

/// Why a language-model request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Network,
    Timeout,
    Authentication,
    RateLimit,
    Api,
    MalformedResponse,
}

impl TransportKind {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Authentication,
            408 | 504 => Self::Timeout,
            429 => Self::RateLimit,
            _ => Self::Api,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate limit",
            Self::Api => "API",
            Self::MalformedResponse => "malformed response",
        };
        f.write_str(name)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_decode() {
            TransportKind::MalformedResponse
        } else if let Some(status) = err.status() {
            TransportKind::from_status(status)
        } else {
            TransportKind::Network
        };
        Self::transport(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_transport_kinds() {
        assert_eq!(
            TransportKind::from_status(reqwest::StatusCode::UNAUTHORIZED),
            TransportKind::Authentication
        );
        assert_eq!(
            TransportKind::from_status(reqwest::StatusCode::FORBIDDEN),
            TransportKind::Authentication
        );
        assert_eq!(
            TransportKind::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
            TransportKind::RateLimit
        );
        assert_eq!(
            TransportKind::from_status(reqwest::StatusCode::GATEWAY_TIMEOUT),
            TransportKind::Timeout
        );
        assert_eq!(
            TransportKind::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            TransportKind::Api
        );
    }

    #[test]
    fn messages_carry_the_cause() {
        let err = ChatError::transport(TransportKind::RateLimit, "slow down");
        assert_eq!(err.to_string(), "rate limit error from the language model: slow down");

        let err = ChatError::UnsupportedFormat {
            extension: ".docx".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported document format: .docx");
    }
}
