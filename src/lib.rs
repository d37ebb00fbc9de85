//! # tryon
//!
//! tryon is the image-preparation and generation-request pipeline behind a virtual try-on
//! studio: a user picks a model photo and a handful of garment photos, and a generative
//! image service dresses the model in every garment.
//!
//! The crate provides layered pieces for:
//!
//! * **Image preparation**: [`downscale::ImageDownscaler`] caps the longest side of every
//!   upload (1600px by default) and leaves images already within bound byte-for-byte intact
//! * **Prompt assembly**: [`prompt::compose_styling_prompt`] builds the styling instruction
//!   from the garment count, the body shape / expression / aesthetic selections and free text
//! * **Provider access**: the [`GenerationClient`] trait, implemented for Google Gemini by
//!   [`clients::gemini::GeminiImageClient`]
//! * **Orchestration**: [`RequestOrchestrator`] runs one generate or upscale at a time,
//!   normalizes failures into a small user-facing taxonomy and saves upscaled results
//! * **Observability**: [`event::EventHandler`] callbacks for every state change, plus
//!   `log` facade output enabled through [`init_logger`]
//!
//! ## Generating a look
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tryon::clients::gemini::{GeminiImageClient, Model};
//! use tryon::download::DirectoryDownloadSink;
//! use tryon::prompt::{BodyShape, CustomizationSelections};
//! use tryon::{RequestOrchestrator, StudioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tryon::init_logger();
//!
//!     let client = Arc::new(GeminiImageClient::new_with_model_enum(
//!         &std::env::var("GEMINI_API_KEY")?,
//!         Model::Gemini25FlashImagePreview,
//!     ));
//!     let studio = RequestOrchestrator::new(
//!         client,
//!         Arc::new(DirectoryDownloadSink::new("downloads")),
//!         StudioConfig::default(),
//!     );
//!
//!     studio.set_model_image(std::fs::read("model.jpg")?, "image/jpeg");
//!     studio.add_item_images(vec![
//!         (std::fs::read("shirt.png")?, "image/png".to_string()),
//!         (std::fs::read("boots.webp")?, "image/webp".to_string()),
//!     ]);
//!     studio.set_customizations(CustomizationSelections {
//!         shape: BodyShape::Athletic,
//!         ..CustomizationSelections::default()
//!     });
//!     studio.set_custom_prompt("city street at dusk");
//!
//!     let outcome = studio.generate().await?;
//!     match outcome.failure() {
//!         None => println!("saved to {}", studio.download_result()?.display()),
//!         Some(failure) => eprintln!("{}", failure),
//!     }
//!
//!     studio.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Observing the pipeline
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use tryon::event::{EventHandler, StudioEvent};
//!
//! struct Logger;
//!
//! #[async_trait]
//! impl EventHandler for Logger {
//!     async fn on_studio_event(&self, event: &StudioEvent) {
//!         if let Ok(json) = serde_json::to_string(event) {
//!             println!("{}", json);
//!         }
//!     }
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding tryon can opt in to `RUST_LOG` driven diagnostics
/// without choosing a logging backend upfront.
///
/// ```rust
/// tryon::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `tryon` module.
pub mod tryon;

// Re-exporting key items for easier external access.
pub use tryon::cancellation;
pub use tryon::cancellation::CancellationToken;
pub use tryon::clients;
pub use tryon::config;
pub use tryon::config::{ConcurrencyPolicy, StudioConfig};
pub use tryon::data_uri;
pub use tryon::download;
pub use tryon::download::{DirectoryDownloadSink, Download, DownloadSink};
pub use tryon::downscale;
pub use tryon::event;
pub use tryon::event::{EventHandler, StudioEvent};
pub use tryon::generation;
pub use tryon::generation::{GenerationClient, GenerationError, GenerationRequest};
pub use tryon::image_asset;
pub use tryon::image_asset::{ImageAsset, ImagePayload, PreviewHandle};
pub use tryon::orchestrator;
pub use tryon::orchestrator::{OrchestratorError, RequestOrchestrator};
pub use tryon::outcome;
pub use tryon::outcome::{FailureKind, GenerationOutcome, OperationKind};
pub use tryon::prompt;
pub use tryon::state;
pub use tryon::state::{Phase, StudioState};
