use thiserror::Error;

use securetransact_types::api::ErrorBody;

use crate::form::FormErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error("form has {} invalid field(s)", .0.len())]
    Form(FormErrors),

    #[error("could not reach the server: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered 2xx with a body that is not the expected JSON.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server answered {status}: {}", .body.error)]
    Api { status: u16, body: ErrorBody },

    #[error("not signed in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's `error` message, if the server answered at all.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => Some(&body.error),
            _ => None,
        }
    }
}
