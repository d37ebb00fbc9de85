//! The request pipeline: downscale, compose, call, normalize, publish.
//!
//! [`RequestOrchestrator`] owns the [`StudioState`] and runs at most one
//! operation (generate or upscale) at a time. Each operation gets a sequence
//! number and a [`CancellationToken`]; every suspension point (image work on
//! the blocking pool and the client call) is raced against that token, and a
//! result whose sequence number is no longer current is dropped instead of
//! being applied.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tryon::clients::gemini::GeminiImageClient;
//! use tryon::download::DirectoryDownloadSink;
//! use tryon::{RequestOrchestrator, StudioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(GeminiImageClient::new_with_model_string(
//!         &std::env::var("GEMINI_API_KEY")?,
//!         "gemini-2.5-flash-image-preview",
//!     ));
//!     let downloads = Arc::new(DirectoryDownloadSink::new("downloads"));
//!     let studio = RequestOrchestrator::new(client, downloads, StudioConfig::default());
//!
//!     studio.set_model_image(std::fs::read("model.png")?, "image/png");
//!     studio.add_item_images(vec![(std::fs::read("jacket.jpg")?, "image/jpeg".to_string())]);
//!
//!     let outcome = studio.generate().await?;
//!     if outcome.is_success() {
//!         studio.upscale().await?;
//!     }
//!     studio.shutdown().await;
//!     Ok(())
//! }
//! ```

use crate::tryon::cancellation::CancellationToken;
use crate::tryon::config::{ConcurrencyPolicy, StudioConfig};
use crate::tryon::data_uri::{data_uri_mime_type, DataUriError};
use crate::tryon::download::{download_file_name, Download, DownloadError, DownloadSink};
use crate::tryon::downscale::{DownscaleError, ImageDownscaler};
use crate::tryon::event::{EventHandler, StudioEvent};
use crate::tryon::generation::{GenerationClient, GenerationError, GenerationRequest};
use crate::tryon::image_asset::{ImageAsset, ImagePayload, PreviewRegistry};
use crate::tryon::outcome::{
    normalize_failure, unknown_failure, FailureKind, GenerationOutcome, OperationKind,
};
use crate::tryon::prompt::{compose_styling_prompt, CustomizationSelections, UPSCALE_PROMPT};
use crate::tryon::state::StudioState;
use chrono::Utc;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

const MISSING_IMAGES_MESSAGE: &str = "Please upload a model image and at least one item image.";
const NOTHING_TO_UPSCALE_MESSAGE: &str = "No image available to upscale.";

/// Refusals returned as `Err`. User-facing failures are
/// [`GenerationOutcome::Failure`] values instead.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Another operation is running and the policy is [`ConcurrencyPolicy::Reject`].
    Busy { running: OperationKind },
    /// There is no result to download.
    NoResult,
    Download(DownloadError),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::Busy { running } => {
                write!(f, "Cannot start: a {} operation is already running", running)
            }
            OrchestratorError::NoResult => write!(f, "No generated image to download"),
            OrchestratorError::Download(err) => write!(f, "{}", err),
        }
    }
}

impl Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OrchestratorError::Download(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DownloadError> for OrchestratorError {
    fn from(err: DownloadError) -> Self {
        OrchestratorError::Download(err)
    }
}

struct LiveOperation {
    operation: OperationKind,
    seq: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Inner {
    state: StudioState,
    last_seq: u64,
    live: Option<LiveOperation>,
    /// Sequence number of the last operation stopped by [`RequestOrchestrator::cancel`].
    cancelled_seq: Option<u64>,
}

enum Admission<T> {
    Started {
        seq: u64,
        token: CancellationToken,
        input: T,
    },
    Rejected(String),
}

/// Why a running operation stopped short of a result.
enum RunError {
    Cancelled,
    Prepare(DownscaleError),
    /// The stored result could not be decoded back into an image.
    Source(DataUriError),
    Client(GenerationError),
}

/// Owns the studio state and sequences generate/upscale operations.
pub struct RequestOrchestrator {
    client: Arc<dyn GenerationClient>,
    downloads: Arc<dyn DownloadSink>,
    previews: PreviewRegistry,
    event_handler: Option<Arc<dyn EventHandler>>,
    config: StudioConfig,
    downscaler: ImageDownscaler,
    inner: Mutex<Inner>,
}

impl RequestOrchestrator {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        downloads: Arc<dyn DownloadSink>,
        config: StudioConfig,
    ) -> Self {
        RequestOrchestrator {
            client,
            downloads,
            previews: PreviewRegistry::new(),
            event_handler: None,
            downscaler: config.downscaler(),
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Attach an event handler. Builder-style, consumes and returns `self`.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Replace the downscaler built from the config (e.g. to change the decode chain).
    pub fn with_downscaler(mut self, downscaler: ImageDownscaler) -> Self {
        self.downscaler = downscaler;
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> StudioState {
        self.lock().state.clone()
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Preview handles issued and not yet released.
    pub fn outstanding_previews(&self) -> usize {
        self.previews.outstanding()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().live.is_some()
    }

    // ── Inputs ────────────────────────────────────────────────────────────

    /// Select the model image, releasing the preview of the one it replaces.
    pub fn set_model_image(
        &self,
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
    ) -> ImageAsset {
        let asset = self.previews.create_asset(ImagePayload::new(bytes, mime_type));
        let replaced = {
            let mut inner = self.lock();
            let replaced = inner.state.model_image.clone();
            inner.state = inner.state.with_model_image(Some(asset.clone()));
            replaced
        };
        if let Some(old) = replaced {
            self.previews.release(&old.preview);
        }
        asset
    }

    pub fn clear_model_image(&self) {
        let replaced = {
            let mut inner = self.lock();
            let replaced = inner.state.model_image.clone();
            inner.state = inner.state.with_model_image(None);
            replaced
        };
        if let Some(old) = replaced {
            self.previews.release(&old.preview);
        }
    }

    /// Append garment images after the existing ones, in the given order.
    pub fn add_item_images(&self, images: Vec<(Vec<u8>, String)>) -> Vec<ImageAsset> {
        let assets: Vec<ImageAsset> = images
            .into_iter()
            .map(|(bytes, mime_type)| self.previews.create_asset(ImagePayload::new(bytes, mime_type)))
            .collect();
        let mut inner = self.lock();
        inner.state = inner.state.with_item_images_appended(assets.clone());
        assets
    }

    /// Remove one garment image. Returns `false` if no image has that id.
    pub fn remove_item_image(&self, id: &str) -> bool {
        let removed = {
            let mut inner = self.lock();
            let removed = inner.state.item_images.iter().find(|a| a.id == id).cloned();
            if removed.is_some() {
                inner.state = inner.state.without_item_image(id);
            }
            removed
        };
        match removed {
            Some(asset) => {
                self.previews.release(&asset.preview);
                true
            }
            None => false,
        }
    }

    pub fn set_customizations(&self, customizations: CustomizationSelections) {
        let mut inner = self.lock();
        inner.state = inner.state.with_customizations(customizations);
    }

    pub fn set_custom_prompt(&self, custom_prompt: impl Into<String>) {
        let mut inner = self.lock();
        inner.state = inner.state.with_custom_prompt(custom_prompt);
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Generate a styled look from the held inputs.
    pub async fn generate(&self) -> Result<GenerationOutcome, OrchestratorError> {
        let snapshot = self.state();
        self.generate_with(
            snapshot.model_image,
            snapshot.item_images,
            snapshot.customizations,
            &snapshot.custom_prompt,
        )
        .await
    }

    /// Generate a styled look from explicit inputs.
    ///
    /// Without a primary image or without any auxiliary the call settles in
    /// `Idle` with a user-input failure and the client is never called.
    pub async fn generate_with(
        &self,
        primary: Option<ImageAsset>,
        auxiliaries: Vec<ImageAsset>,
        customizations: CustomizationSelections,
        free_text: &str,
    ) -> Result<GenerationOutcome, OrchestratorError> {
        let operation = OperationKind::Generate;
        let admission = self.admit(operation, |_| match primary {
            Some(primary) if !auxiliaries.is_empty() => Ok((primary, auxiliaries)),
            _ => Err(MISSING_IMAGES_MESSAGE.to_string()),
        });
        let (seq, token, (primary, auxiliaries)) = match admission {
            Err(running) => return Err(self.rejected(operation, running).await),
            Ok(Admission::Rejected(message)) => {
                return Ok(self.input_rejected(operation, message).await)
            }
            Ok(Admission::Started { seq, token, input }) => {
                self.emit(StudioEvent::OperationStarted { operation, seq }).await;
                (seq, token, input)
            }
        };

        let result = self
            .run_generate(seq, &token, primary, auxiliaries, &customizations, free_text)
            .await;
        Ok(self.settle(operation, seq, &token, result).await)
    }

    /// Upscale the most recent result and save it automatically on success.
    pub async fn upscale(&self) -> Result<GenerationOutcome, OrchestratorError> {
        let operation = OperationKind::Upscale;
        let admission = self.admit(operation, |state| {
            state
                .last_result
                .clone()
                .ok_or_else(|| NOTHING_TO_UPSCALE_MESSAGE.to_string())
        });
        let (seq, token, source) = match admission {
            Err(running) => return Err(self.rejected(operation, running).await),
            Ok(Admission::Rejected(message)) => {
                return Ok(self.input_rejected(operation, message).await)
            }
            Ok(Admission::Started { seq, token, input }) => {
                self.emit(StudioEvent::OperationStarted { operation, seq }).await;
                (seq, token, input)
            }
        };

        let result = match ImageAsset::from_data_uri(&source) {
            Ok(primary) => {
                let request = GenerationRequest::new(primary, Vec::new(), UPSCALE_PROMPT);
                self.call_client(seq, &token, request).await
            }
            Err(err) => Err(RunError::Source(err)),
        };
        Ok(self.settle(operation, seq, &token, result).await)
    }

    /// Request cancellation of the running operation.
    ///
    /// The state returns to `Idle` with a notice immediately; whatever the
    /// client eventually returns is ignored. Returns `false` when nothing was running.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        match inner.live.take() {
            Some(live) => {
                live.token.cancel();
                inner.cancelled_seq = Some(live.seq);
                inner.state = inner.state.cancelled(live.operation);
                info!(
                    "RequestOrchestrator: cancelled {} (seq {})",
                    live.operation, live.seq
                );
                true
            }
            None => false,
        }
    }

    /// Save the current result under `<product>-styled-look.<ext>`.
    pub fn download_result(&self) -> Result<PathBuf, OrchestratorError> {
        let data_uri = self
            .lock()
            .state
            .last_result
            .clone()
            .ok_or(OrchestratorError::NoResult)?;
        let download = Download::from_data_uri(&self.config.product_name, &data_uri, false)?;
        Ok(self.downloads.save(&download)?)
    }

    /// Session teardown: cancel whatever is running and release every preview.
    pub async fn shutdown(&self) {
        self.cancel();
        let count = self.previews.release_all();
        debug!("RequestOrchestrator: released {} preview handle(s)", count);
        self.emit(StudioEvent::PreviewsReleased { count }).await;
    }

    // ── Pipeline ──────────────────────────────────────────────────────────

    /// Busy check, validation, sequence bump and the `Running` flag, all under
    /// one lock and before the first suspension point.
    ///
    /// Validation runs before anything is superseded: invalid input never
    /// stops a running operation, and while one is running the state is left
    /// alone and only the returned failure reports the problem.
    fn admit<T, F>(&self, operation: OperationKind, validate: F) -> Result<Admission<T>, OperationKind>
    where
        F: FnOnce(&StudioState) -> Result<T, String>,
    {
        let mut inner = self.lock();
        if let (Some(live), ConcurrencyPolicy::Reject) = (&inner.live, self.config.concurrency) {
            return Err(live.operation);
        }

        let input = match validate(&inner.state) {
            Ok(input) => input,
            Err(message) => {
                if inner.live.is_none() {
                    inner.state = inner.state.input_rejected(operation, message.clone());
                }
                return Ok(Admission::Rejected(message));
            }
        };

        if let Some(live) = inner.live.take() {
            live.token.cancel();
            debug!(
                "RequestOrchestrator: {} (seq {}) superseded by {}",
                live.operation, live.seq, operation
            );
        }

        inner.last_seq += 1;
        let seq = inner.last_seq;
        let token = CancellationToken::new();
        inner.live = Some(LiveOperation {
            operation,
            seq,
            token: token.clone(),
        });
        inner.state = inner.state.begin(operation, seq, Utc::now());
        Ok(Admission::Started { seq, token, input })
    }

    fn is_current(&self, seq: u64) -> bool {
        self.lock().live.as_ref().map_or(false, |live| live.seq == seq)
    }

    async fn rejected(&self, requested: OperationKind, running: OperationKind) -> OrchestratorError {
        info!(
            "RequestOrchestrator: {} rejected, {} already running",
            requested, running
        );
        self.emit(StudioEvent::OperationRejected { requested, running })
            .await;
        OrchestratorError::Busy { running }
    }

    async fn input_rejected(&self, operation: OperationKind, message: String) -> GenerationOutcome {
        self.emit(StudioEvent::InputRejected {
            operation,
            message: message.clone(),
        })
        .await;
        GenerationOutcome::Failure(FailureKind::UserInput(message))
    }

    async fn run_generate(
        &self,
        seq: u64,
        token: &CancellationToken,
        primary: ImageAsset,
        auxiliaries: Vec<ImageAsset>,
        customizations: &CustomizationSelections,
        free_text: &str,
    ) -> Result<String, RunError> {
        let primary = self.prepare(seq, token, 0, primary).await?;
        let mut prepared = Vec::with_capacity(auxiliaries.len());
        for (offset, asset) in auxiliaries.into_iter().enumerate() {
            prepared.push(self.prepare(seq, token, offset + 1, asset).await?);
        }

        let instruction = compose_styling_prompt(prepared.len(), customizations, free_text);
        let request = GenerationRequest::new(primary, prepared, instruction);
        self.call_client(seq, token, request).await
    }

    /// Downscale one image on the blocking pool.
    async fn prepare(
        &self,
        seq: u64,
        token: &CancellationToken,
        index: usize,
        asset: ImageAsset,
    ) -> Result<ImageAsset, RunError> {
        let downscaler = self.downscaler.clone();
        let task = tokio::task::spawn_blocking(
            move || -> Result<(ImageAsset, bool), DownscaleError> {
                let prepared = downscaler.downscale_asset(&asset)?;
                let resized = !prepared.payload.shares_buffer_with(&asset.payload);
                Ok((prepared, resized))
            },
        );

        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunError::Cancelled),
            joined = task => joined,
        };
        let (prepared, resized) = joined
            .map_err(|e| RunError::Prepare(DownscaleError::Join(e.to_string())))?
            .map_err(RunError::Prepare)?;

        self.emit(StudioEvent::ImagePrepared {
            seq,
            index,
            resized,
            bytes: prepared.payload.len(),
        })
        .await;
        Ok(prepared)
    }

    async fn call_client(
        &self,
        seq: u64,
        token: &CancellationToken,
        request: GenerationRequest,
    ) -> Result<String, RunError> {
        self.emit(StudioEvent::ClientCallStarted {
            seq,
            model: self.client.model_name().to_string(),
            auxiliary_count: request.auxiliaries.len(),
            payload_bytes: request.payload_bytes(),
        })
        .await;

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RunError::Cancelled),
            result = self.client.generate(&request, token) => result.map_err(RunError::Client),
        }
    }

    /// Apply a finished operation's result if it is still the current one.
    async fn settle(
        &self,
        operation: OperationKind,
        seq: u64,
        token: &CancellationToken,
        result: Result<String, RunError>,
    ) -> GenerationOutcome {
        let mut download_notice = None;
        if let (OperationKind::Upscale, Ok(data_uri)) = (operation, &result) {
            if !token.is_cancelled() {
                download_notice = self.auto_download(seq, data_uri).await;
            }
        }

        let (event, outcome) = {
            let mut inner = self.lock();
            if !inner.live.as_ref().map_or(false, |live| live.seq == seq) {
                // An explicit cancel already settled the state; anything else was superseded.
                let event = if inner.cancelled_seq == Some(seq) {
                    StudioEvent::OperationCancelled { operation, seq }
                } else {
                    StudioEvent::ResultDiscarded { operation, seq }
                };
                (event, GenerationOutcome::Failure(FailureKind::Cancelled))
            } else {
                inner.live = None;
                let (next, event, outcome) =
                    settled_state(&inner.state, operation, seq, result, download_notice);
                inner.state = next;
                (event, outcome)
            }
        };

        match &event {
            StudioEvent::OperationSucceeded { .. } => {
                info!("RequestOrchestrator: {} (seq {}) succeeded", operation, seq)
            }
            StudioEvent::OperationFailed { message, .. } => warn!(
                "RequestOrchestrator: {} (seq {}) failed: {}",
                operation, seq, message
            ),
            _ => debug!("RequestOrchestrator: {} (seq {}) settled as cancelled", operation, seq),
        }
        self.emit(event).await;
        outcome
    }

    /// Save an upscaled result. Returns a notice when saving failed.
    ///
    /// Nothing is written once operation `seq` has been cancelled or superseded.
    /// The check happens right before the sink is handed the file; a cancel that
    /// lands while the sink is already writing cannot take the file back.
    async fn auto_download(&self, seq: u64, data_uri: &str) -> Option<String> {
        let product = &self.config.product_name;
        let fallback_name =
            download_file_name(product, data_uri_mime_type(data_uri).unwrap_or(""), true);

        let saved = match Download::from_data_uri(product, data_uri, true) {
            Ok(download) => {
                if !self.is_current(seq) {
                    debug!("RequestOrchestrator: upscale (seq {}) no longer current, not saving", seq);
                    return None;
                }
                let file_name = download.file_name.clone();
                let sink = Arc::clone(&self.downloads);
                let joined = tokio::task::spawn_blocking(move || sink.save(&download)).await;
                let saved = joined.unwrap_or_else(|e| {
                    Err(DownloadError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
                });
                saved.map(|path| (file_name, path))
            }
            Err(err) => Err(err),
        };

        match saved {
            Ok((file_name, path)) => {
                self.emit(StudioEvent::DownloadSaved {
                    file_name,
                    path: path.display().to_string(),
                })
                .await;
                None
            }
            Err(err) => {
                warn!("RequestOrchestrator: automatic download failed: {}", err);
                self.emit(StudioEvent::DownloadFailed {
                    file_name: fallback_name,
                    message: err.to_string(),
                })
                .await;
                Some(format!("The upscaled image could not be saved: {}", err))
            }
        }
    }

    async fn emit(&self, event: StudioEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_studio_event(&event).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Next state, event and outcome for the current operation's result.
fn settled_state(
    state: &StudioState,
    operation: OperationKind,
    seq: u64,
    result: Result<String, RunError>,
    download_notice: Option<String>,
) -> (StudioState, StudioEvent, GenerationOutcome) {
    let failure = match result {
        Ok(image_data_uri) => {
            let mut next = state.succeeded(operation, image_data_uri.clone());
            if let Some(notice) = download_notice {
                next = next.with_notice(notice);
            }
            let event = StudioEvent::OperationSucceeded {
                operation,
                seq,
                result_length: image_data_uri.len(),
            };
            return (next, event, GenerationOutcome::Success { image_data_uri });
        }
        Err(RunError::Cancelled) => FailureKind::Cancelled,
        Err(RunError::Prepare(err)) => unknown_failure(&err.to_string(), operation),
        Err(RunError::Source(err)) => unknown_failure(&err.to_string(), operation),
        Err(RunError::Client(err)) => normalize_failure(&err, operation),
    };

    if failure == FailureKind::Cancelled {
        return (
            state.cancelled(operation),
            StudioEvent::OperationCancelled { operation, seq },
            GenerationOutcome::Failure(failure),
        );
    }
    let event = StudioEvent::OperationFailed {
        operation,
        seq,
        message: failure.message(),
    };
    (
        state.failed(operation, failure.clone()),
        event,
        GenerationOutcome::Failure(failure),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UnusedClient;

    #[async_trait]
    impl GenerationClient for UnusedClient {
        async fn generate(
            &self,
            _request: &GenerationRequest,
            _cancel: &CancellationToken,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::new("not called"))
        }

        fn model_name(&self) -> &str {
            "unused"
        }
    }

    #[derive(Default)]
    struct CountingSink {
        saved: Mutex<Vec<String>>,
    }

    impl DownloadSink for CountingSink {
        fn save(&self, download: &Download) -> Result<PathBuf, DownloadError> {
            self.saved
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(download.file_name.clone());
            Ok(PathBuf::from(&download.file_name))
        }
    }

    const RESULT: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn orchestrator(sink: Arc<CountingSink>) -> RequestOrchestrator {
        RequestOrchestrator::new(Arc::new(UnusedClient), sink, StudioConfig::default())
    }

    fn start_upscale(studio: &RequestOrchestrator) -> u64 {
        let mut inner = studio.lock();
        inner.state = inner.state.succeeded(OperationKind::Generate, RESULT.to_string());
        drop(inner);
        match studio.admit(OperationKind::Upscale, |state| {
            state.last_result.clone().ok_or_else(String::new)
        }) {
            Ok(Admission::Started { seq, .. }) => seq,
            _ => panic!("upscale was not admitted"),
        }
    }

    #[tokio::test]
    async fn download_is_saved_for_the_current_operation() {
        let sink = Arc::new(CountingSink::default());
        let studio = orchestrator(sink.clone());
        let seq = start_upscale(&studio);

        assert_eq!(studio.auto_download(seq, RESULT).await, None);
        assert_eq!(
            *sink.saved.lock().unwrap(),
            vec!["gemini-styled-look-upscaled.png".to_string()]
        );
    }

    #[tokio::test]
    async fn download_is_skipped_after_cancel() {
        let sink = Arc::new(CountingSink::default());
        let studio = orchestrator(sink.clone());
        let seq = start_upscale(&studio);
        assert!(studio.cancel());

        assert_eq!(studio.auto_download(seq, RESULT).await, None);
        assert!(sink.saved.lock().unwrap().is_empty());

        let token = CancellationToken::new();
        let outcome = studio
            .settle(OperationKind::Upscale, seq, &token, Ok(RESULT.to_string()))
            .await;
        assert_eq!(outcome, GenerationOutcome::Failure(FailureKind::Cancelled));
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_input_does_not_supersede() {
        let config = StudioConfig {
            concurrency: ConcurrencyPolicy::Supersede,
            ..StudioConfig::default()
        };
        let studio = RequestOrchestrator::new(
            Arc::new(UnusedClient),
            Arc::new(CountingSink::default()),
            config,
        );
        let seq = start_upscale(&studio);
        let running = studio.state();

        let admission = studio.admit(OperationKind::Generate, |_| -> Result<(), String> {
            Err(MISSING_IMAGES_MESSAGE.to_string())
        });

        assert!(matches!(admission, Ok(Admission::Rejected(_))));
        assert!(studio.is_current(seq));
        assert_eq!(studio.state(), running);
    }
}
