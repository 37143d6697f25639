//! Application error types shared by the engine and its HTTP gateway.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A fetch failed or its body could not be decoded. Local state is kept.
    #[error("Failed to load {what}: {reason}")]
    Load { what: String, reason: String },

    /// The server answered a mutation with a non-success status.
    #[error("Request rejected: {}", rejection_reason(.status, .message))]
    MutationRejected {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Rejected locally before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn rejection_reason(status: &Option<u16>, message: &Option<String>) -> String {
    match (status, message) {
        (_, Some(message)) => message.clone(),
        (Some(status), None) => format!("status {}", status),
        (None, None) => "no reason given".to_string(),
    }
}

impl AppError {
    pub fn load(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Load {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        Self::MutationRejected { status, message }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short text shown to the admin when an operation fails.
    pub fn notice_text(&self) -> String {
        match self {
            Self::Load { what, .. } => format!("Error loading {}!", what),
            Self::MutationRejected {
                message: Some(message),
                ..
            } => format!("Error: {}", message),
            Self::MutationRejected {
                status: Some(status),
                message: None,
            } => format!("Error: request failed with status {}", status),
            Self::MutationRejected { .. } => "Error: request failed".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Transport(_) => "Server error!".to_string(),
            Self::Serialization(err) => format!("Error: {}", err),
            Self::Io(err) => format!("Error: {}", err),
        }
    }
}
