//! Studio event system.
//!
//! Provides a callback-based observability layer for the
//! [`RequestOrchestrator`](crate::RequestOrchestrator). Every state transition
//! the orchestrator makes is published as a [`StudioEvent`] to an optional
//! [`EventHandler`], so a UI layer can redraw without polling and a host can
//! log or trace operations.
//!
//! # Event Flow (successful upscale)
//!
//! ```text
//! OperationStarted { operation: Upscale, seq: 4 }
//!   └─ ClientCallStarted { seq: 4, auxiliary_count: 0 }
//!   └─ DownloadSaved { file_name: "gemini-styled-look-upscaled.png" }
//! OperationSucceeded { operation: Upscale, seq: 4 }
//! ```
//!
//! # Event Flow (generate superseded by a second generate)
//!
//! ```text
//! OperationStarted { operation: Generate, seq: 1 }
//!   └─ ImagePrepared { seq: 1, index: 0, resized: true }
//!   └─ ClientCallStarted { seq: 1, auxiliary_count: 2 }
//! OperationStarted { operation: Generate, seq: 2 }      <- cancels seq 1
//! ResultDiscarded { operation: Generate, seq: 1 }
//!   ...
//! OperationSucceeded { operation: Generate, seq: 2 }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tryon::event::{EventHandler, StudioEvent};
//! use async_trait::async_trait;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn on_studio_event(&self, event: &StudioEvent) {
//!         match event {
//!             StudioEvent::OperationFailed { message, .. } => eprintln!("failed: {}", message),
//!             other => println!("{:?}", other),
//!         }
//!     }
//! }
//! ```

use crate::tryon::outcome::OperationKind;
use async_trait::async_trait;
use serde::Serialize;

/// Events emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StudioEvent {
    // ── Operation lifecycle ───────────────────────────────────────────────

    /// An operation passed validation and is now `Running`.
    OperationStarted {
        operation: OperationKind,
        /// Sequence number identifying this operation.
        seq: u64,
    },

    /// A request arrived while another operation was running and was refused.
    /// No state changed and the client was not called.
    OperationRejected {
        requested: OperationKind,
        running: OperationKind,
    },

    /// Validation failed before any work started (missing images, nothing to upscale).
    InputRejected {
        operation: OperationKind,
        message: String,
    },

    /// The operation settled with an image.
    OperationSucceeded {
        operation: OperationKind,
        seq: u64,
        /// Length of the returned data URI in characters.
        result_length: usize,
    },

    /// The operation settled with a normalized failure.
    OperationFailed {
        operation: OperationKind,
        seq: u64,
        /// User-visible message.
        message: String,
    },

    /// The operation was cancelled and settled to `Idle`.
    OperationCancelled { operation: OperationKind, seq: u64 },

    /// A superseded operation finished after a newer one started; its result
    /// was dropped without touching state.
    ResultDiscarded { operation: OperationKind, seq: u64 },

    // ── Pipeline steps ────────────────────────────────────────────────────

    /// One input image was prepared for upload. Index 0 is the primary image;
    /// auxiliaries follow in order.
    ImagePrepared {
        seq: u64,
        index: usize,
        /// Whether the image had to be downscaled and re-encoded.
        resized: bool,
        bytes: usize,
    },

    /// The generation client is being called.
    ClientCallStarted {
        seq: u64,
        model: String,
        auxiliary_count: usize,
        payload_bytes: usize,
    },

    // ── Side effects ──────────────────────────────────────────────────────

    /// A result was saved through the download sink.
    DownloadSaved { file_name: String, path: String },

    /// Saving a result failed; the operation outcome is unaffected.
    DownloadFailed { file_name: String, message: String },

    /// Session teardown released the outstanding preview handles.
    PreviewsReleased { count: usize },
}

/// Receives [`StudioEvent`]s from a [`RequestOrchestrator`](crate::RequestOrchestrator).
///
/// The default implementation is a no-op, so implementors only override what
/// they care about. Handlers are called outside the orchestrator's state lock.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_studio_event(&self, _event: &StudioEvent) {}
}
