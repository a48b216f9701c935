use thiserror::Error;

use crate::generation::DocumentType;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// ─── Generation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{document_type} generation failed: {detail}")]
    Artifact {
        document_type: DocumentType,
        detail: String,
    },

    #[error("template render failed: {0}")]
    Template(String),

    #[error("provider {provider} returned an empty document")]
    EmptyOutput { provider: String },

    #[error("generation timed out")]
    TimedOut,
}

// ─── Client errors ───────────────────────────────────────────────────────────

/// Failure category, set by the layer that observed the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClientErrorKind {
    /// Transport-level failure: connection refused, DNS, reset.
    Network,
    /// The configured request timeout elapsed.
    Timeout,
    /// The server answered with a 5xx status.
    Server,
    /// Anything else: unexpected status, undecodable body.
    Unknown,
}

impl ClientErrorKind {
    /// Fixed user-facing copy for each failure category.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Network => {
                "Unable to connect. Please check your internet connection and try again."
            }
            Self::Timeout => "The request took too long to complete. Please try again.",
            Self::Server => "Something went wrong on our end. Please try again in a moment.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
    /// First `errors[].detail` from a structured server failure body.
    pub detail: Option<String>,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

// ─── Session errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no generated documents in this session")]
    NoResults,

    #[error("nothing failed; there is nothing to retry")]
    NothingToRetry,

    #[error("regeneration limit reached for {target}")]
    LimitReached { target: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = ConfigError::Validation("bad port".into());
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn artifact_error_names_document_type() {
        let err = GenerationError::Artifact {
            document_type: DocumentType::ResponseLetter,
            detail: "provider down".into(),
        };
        assert_eq!(
            err.to_string(),
            "responseLetter generation failed: provider down"
        );
    }

    #[test]
    fn session_error_wraps_client_error() {
        let err: SessionError = ClientError::new(ClientErrorKind::Network, "refused").into();
        assert_eq!(err.to_string(), "network error: refused");
    }

    #[test]
    fn every_client_kind_has_distinct_copy() {
        let kinds = [
            ClientErrorKind::Network,
            ClientErrorKind::Timeout,
            ClientErrorKind::Server,
            ClientErrorKind::Unknown,
        ];
        let mut messages: Vec<_> = kinds.iter().map(|k| k.user_message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn client_error_keeps_server_detail() {
        let err = ClientError::new(ClientErrorKind::Server, "HTTP 500")
            .with_detail(Some("narrative: model overloaded".into()));
        assert_eq!(err.detail.as_deref(), Some("narrative: model overloaded"));
        assert_eq!(err.to_string(), "server error: HTTP 500");
    }
}
