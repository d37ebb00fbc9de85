//! The studio's UI state as a plain value.
//!
//! [`StudioState`] holds everything a front end renders: the selected images,
//! the customization choices, the current phase and the latest outcome. Every
//! mutation is a pure function from `&StudioState` to a new `StudioState`;
//! the [`RequestOrchestrator`](crate::RequestOrchestrator) is the single owner
//! that swaps the current value for the next one. Image payloads are shared
//! buffers, so producing a new state does not copy image bytes.
//!
//! ```
//! use tryon::outcome::OperationKind;
//! use tryon::state::{Phase, StudioState};
//!
//! let idle = StudioState::default();
//! let running = idle.begin(OperationKind::Generate, 1, chrono::Utc::now());
//! assert_eq!(running.running_operation(), Some(OperationKind::Generate));
//!
//! let done = running.succeeded(OperationKind::Generate, "data:image/png;base64,AA==".to_string());
//! assert_eq!(done.phase, Phase::Succeeded { operation: OperationKind::Generate });
//! assert_eq!(done.last_result.as_deref(), Some("data:image/png;base64,AA=="));
//! ```

use crate::tryon::image_asset::{ImageAsset, PreviewHandle};
use crate::tryon::outcome::{FailureKind, GenerationOutcome, OperationKind};
use crate::tryon::prompt::CustomizationSelections;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the studio is in its `Idle → Running → Succeeded | Failed` cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Running {
        operation: OperationKind,
        seq: u64,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        operation: OperationKind,
    },
    Failed {
        operation: OperationKind,
    },
}

/// Everything the UI shows, as one serializable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioState {
    pub model_image: Option<ImageAsset>,
    pub item_images: Vec<ImageAsset>,
    pub customizations: CustomizationSelections,
    pub custom_prompt: String,
    pub phase: Phase,
    /// Outcome of the last settled operation; cleared when a new one begins.
    pub outcome: Option<GenerationOutcome>,
    /// Most recent successful image, the source for upscaling and downloads.
    pub last_result: Option<String>,
    /// User-visible error message.
    pub error: Option<String>,
    /// Informational message (cancellation, download problems).
    pub notice: Option<String>,
}

impl StudioState {
    // ── Inputs ────────────────────────────────────────────────────────────

    pub fn with_model_image(&self, asset: Option<ImageAsset>) -> Self {
        StudioState {
            model_image: asset,
            ..self.clone()
        }
    }

    /// Append garments after the existing ones, preserving order.
    pub fn with_item_images_appended(&self, assets: Vec<ImageAsset>) -> Self {
        let mut item_images = self.item_images.clone();
        item_images.extend(assets);
        StudioState {
            item_images,
            ..self.clone()
        }
    }

    pub fn without_item_image(&self, id: &str) -> Self {
        StudioState {
            item_images: self
                .item_images
                .iter()
                .filter(|asset| asset.id != id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn with_customizations(&self, customizations: CustomizationSelections) -> Self {
        StudioState {
            customizations,
            ..self.clone()
        }
    }

    pub fn with_custom_prompt(&self, custom_prompt: impl Into<String>) -> Self {
        StudioState {
            custom_prompt: custom_prompt.into(),
            ..self.clone()
        }
    }

    // ── Operation lifecycle ───────────────────────────────────────────────

    /// Enter `Running`, clearing the previous outcome and messages.
    ///
    /// A new generate also clears the last result; an upscale keeps it on
    /// screen until it is replaced.
    pub fn begin(&self, operation: OperationKind, seq: u64, started_at: DateTime<Utc>) -> Self {
        let last_result = match operation {
            OperationKind::Generate => None,
            OperationKind::Upscale => self.last_result.clone(),
        };
        StudioState {
            phase: Phase::Running {
                operation,
                seq,
                started_at,
            },
            outcome: None,
            last_result,
            error: None,
            notice: None,
            ..self.clone()
        }
    }

    /// Validation failed before the operation started.
    ///
    /// A generate returns straight to `Idle`; an upscale with nothing to
    /// upscale settles in `Failed`. Either way the message is shown as an error.
    pub fn input_rejected(&self, operation: OperationKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let phase = match operation {
            OperationKind::Generate => Phase::Idle,
            OperationKind::Upscale => Phase::Failed { operation },
        };
        StudioState {
            phase,
            outcome: Some(GenerationOutcome::Failure(FailureKind::UserInput(
                message.clone(),
            ))),
            error: Some(message),
            notice: None,
            ..self.clone()
        }
    }

    pub fn succeeded(&self, operation: OperationKind, image_data_uri: String) -> Self {
        StudioState {
            phase: Phase::Succeeded { operation },
            outcome: Some(GenerationOutcome::Success {
                image_data_uri: image_data_uri.clone(),
            }),
            last_result: Some(image_data_uri),
            error: None,
            ..self.clone()
        }
    }

    pub fn failed(&self, operation: OperationKind, failure: FailureKind) -> Self {
        StudioState {
            phase: Phase::Failed { operation },
            error: Some(failure.message()),
            outcome: Some(GenerationOutcome::Failure(failure)),
            ..self.clone()
        }
    }

    /// The running operation was cancelled: back to `Idle` with an informational notice.
    pub fn cancelled(&self, operation: OperationKind) -> Self {
        StudioState {
            phase: Phase::Idle,
            outcome: None,
            error: None,
            notice: Some(operation.cancelled_notice().to_string()),
            ..self.clone()
        }
    }

    pub fn with_notice(&self, notice: impl Into<String>) -> Self {
        StudioState {
            notice: Some(notice.into()),
            ..self.clone()
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn running_operation(&self) -> Option<OperationKind> {
        match self.phase {
            Phase::Running { operation, .. } => Some(operation),
            _ => None,
        }
    }

    pub fn running_seq(&self) -> Option<u64> {
        match self.phase {
            Phase::Running { seq, .. } => Some(seq),
            _ => None,
        }
    }

    /// Whether the inputs are complete enough to generate.
    pub fn can_generate(&self) -> bool {
        self.model_image.is_some() && !self.item_images.is_empty() && self.running_operation().is_none()
    }

    /// Preview handles referenced by the held images.
    pub fn preview_handles(&self) -> Vec<&PreviewHandle> {
        self.model_image
            .iter()
            .chain(self.item_images.iter())
            .map(|asset| &asset.preview)
            .collect()
    }
}
