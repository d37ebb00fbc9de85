//! Outcomes of generate/upscale operations and the failure taxonomy shown to users.
//!
//! Raw failures (from the client, from cancellation, from image decoding) are
//! folded into [`FailureKind`] by [`normalize_failure`]; that taxonomy is the
//! only error surface the UI layer ever sees.

use crate::tryon::generation::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two operations the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Generate,
    Upscale,
}

impl OperationKind {
    /// Message used when a failure arrives with no text of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            OperationKind::Generate => "An unknown error occurred.",
            OperationKind::Upscale => "An unknown error occurred during the upscaling process.",
        }
    }

    /// Informational text shown when the operation is cancelled.
    pub fn cancelled_notice(&self) -> &'static str {
        match self {
            OperationKind::Generate => "Generation cancelled.",
            OperationKind::Upscale => "Upscaling cancelled.",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Generate => write!(f, "generate"),
            OperationKind::Upscale => write!(f, "upscale"),
        }
    }
}

/// User-facing failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing input or nothing to act on; no service call was made.
    UserInput(String),
    /// Superseded or explicitly cancelled.
    Cancelled,
    /// Service rejected the upload size (413).
    PayloadTooLarge,
    /// Service throttled the request (429).
    RateLimited,
    /// Service-side failure (5xx).
    ServiceUnavailable,
    /// Anything else, with the original message trimmed.
    Unknown(String),
}

impl FailureKind {
    /// Text to show the user.
    pub fn message(&self) -> String {
        match self {
            FailureKind::UserInput(msg) | FailureKind::Unknown(msg) => msg.clone(),
            FailureKind::Cancelled => "The request was cancelled.".to_string(),
            FailureKind::PayloadTooLarge => {
                "The images are too large for the service. Try fewer or smaller images.".to_string()
            }
            FailureKind::RateLimited => {
                "The service is receiving too many requests. Please wait a moment and try again."
                    .to_string()
            }
            FailureKind::ServiceUnavailable => {
                "The image service is currently unavailable. Please try again later.".to_string()
            }
        }
    }

    pub fn is_user_input(&self) -> bool {
        matches!(self, FailureKind::UserInput(_))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Terminal result of one operation: a whole image or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success { image_data_uri: String },
    Failure(FailureKind),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    pub fn image_data_uri(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Success { image_data_uri } => Some(image_data_uri),
            GenerationOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            GenerationOutcome::Success { .. } => None,
            GenerationOutcome::Failure(kind) => Some(kind),
        }
    }
}

/// Map a client failure onto the user-facing taxonomy.
///
/// The status comes from [`GenerationError::status`] or, failing that, from a
/// parenthesized 4xx/5xx code in the message (`"request failed (429): quota"`).
/// Bare numbers in free text (pixel sizes, byte offsets) are never read as a status.
///
/// ```
/// use tryon::generation::GenerationError;
/// use tryon::outcome::{normalize_failure, FailureKind, OperationKind};
///
/// let kind = normalize_failure(&GenerationError::with_status(413, "too big"), OperationKind::Generate);
/// assert_eq!(kind, FailureKind::PayloadTooLarge);
///
/// let kind = normalize_failure(&GenerationError::new("  boom "), OperationKind::Generate);
/// assert_eq!(kind, FailureKind::Unknown("boom".to_string()));
/// ```
pub fn normalize_failure(error: &GenerationError, operation: OperationKind) -> FailureKind {
    if error.cancelled {
        return FailureKind::Cancelled;
    }
    match error.status.or_else(|| embedded_status(&error.message)) {
        Some(413) => FailureKind::PayloadTooLarge,
        Some(429) => FailureKind::RateLimited,
        Some(status) if (500..=599).contains(&status) => FailureKind::ServiceUnavailable,
        _ => unknown_failure(&error.message, operation),
    }
}

/// `Unknown` with the trimmed message, or the operation's fallback text when empty.
pub fn unknown_failure(message: &str, operation: OperationKind) -> FailureKind {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        FailureKind::Unknown(operation.fallback_message().to_string())
    } else {
        FailureKind::Unknown(trimmed.to_string())
    }
}

/// First `(NNN)` group in `message` whose code is in 400..=599.
fn embedded_status(message: &str) -> Option<u16> {
    message
        .split('(')
        .skip(1)
        .filter_map(|rest| {
            let (code, _) = rest.split_once(')')?;
            if code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()) {
                code.parse::<u16>().ok()
            } else {
                None
            }
        })
        .find(|code| (400..=599).contains(code))
}
