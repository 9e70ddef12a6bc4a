/// Edit request gateway
///
/// Packages the session's image(s) and instruction into one call to the
/// remote image model and maps the outcome back into a session transition.
/// The gateway never retries and never applies a partial result.
///
/// Architecture:
/// - `gemini.rs` - `generateContent` client for the Gemini image models

pub mod gemini;

pub use gemini::GeminiClient;

use thiserror::Error;
use tracing::warn;

use crate::state::{EncodedImage, Transition};

/// Reason shown when a failure carries no message of its own
pub const GENERIC_FAILURE: &str = "处理过程中发生意外错误。";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential configured; detected before any request is built
    #[error("API Key is missing. Please set GEMINI_API_KEY (or API_KEY).")]
    MissingCredential,

    /// The service answered with an error status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// The request never got a usable answer (DNS, TLS, timeout, bad JSON...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A well-formed response without inline image data
    #[error("No image data returned from the model.")]
    NoImageReturned,

    /// Inline data that is not valid base64
    #[error("Model returned an unreadable image: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

impl GatewayError {
    /// HTTP status for service-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Service { status, .. } => Some(*status),
            GatewayError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// The single opaque reason string handed to the session
    pub fn reason(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

/// Map a finished gateway call onto the session state machine
pub fn outcome(result: Result<EncodedImage, GatewayError>) -> Transition {
    match result {
        Ok(image) => Transition::EditSucceeded(image),
        Err(err) => {
            warn!(status = ?err.status(), error = %err, "edit request failed");
            Transition::EditFailed(err.reason())
        }
    }
}
