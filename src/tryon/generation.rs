//! The external image-generation contract.
//!
//! This module defines the [`GenerationClient`] trait through which the studio
//! reaches a generative-image service, along with the request and error types
//! that cross that boundary.
//!
//! # Overview
//!
//! A client receives one primary (model) image, zero or more auxiliary (garment)
//! images in order, and an instruction string. It answers with a single image
//! encoded as a data URI, or fails with a [`GenerationError`] that may carry the
//! HTTP status the service returned. The wire protocol and authentication belong
//! to the implementation; [`GeminiImageClient`](crate::clients::gemini::GeminiImageClient)
//! is the one this crate ships.
//!
//! # Implementing a client
//!
//! ```rust
//! use async_trait::async_trait;
//! use tryon::cancellation::CancellationToken;
//! use tryon::generation::{GenerationClient, GenerationError, GenerationRequest};
//!
//! struct EchoClient;
//!
//! #[async_trait]
//! impl GenerationClient for EchoClient {
//!     async fn generate(
//!         &self,
//!         request: &GenerationRequest,
//!         cancel: &CancellationToken,
//!     ) -> Result<String, GenerationError> {
//!         if cancel.is_cancelled() {
//!             return Err(GenerationError::cancelled());
//!         }
//!         // Hand the primary image straight back.
//!         Ok(request.primary.payload.to_data_uri())
//!     }
//!
//!     fn model_name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use crate::tryon::cancellation::CancellationToken;
use crate::tryon::image_asset::ImageAsset;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// Everything one generation call needs. Built once per call and never mutated.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The subject image garments are composited onto.
    pub primary: ImageAsset,
    /// Garment or accessory images, in the order the user supplied them.
    pub auxiliaries: Vec<ImageAsset>,
    /// Natural-language instruction.
    pub instruction: String,
}

impl GenerationRequest {
    pub fn new(primary: ImageAsset, auxiliaries: Vec<ImageAsset>, instruction: impl Into<String>) -> Self {
        GenerationRequest {
            primary,
            auxiliaries,
            instruction: instruction.into(),
        }
    }

    /// Total bytes of image payload carried by the request.
    pub fn payload_bytes(&self) -> usize {
        self.primary.payload.len()
            + self
                .auxiliaries
                .iter()
                .map(|asset| asset.payload.len())
                .sum::<usize>()
    }
}

/// Failure reported by a [`GenerationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    /// HTTP (or HTTP-like) status code, when the service returned one.
    pub status: Option<u16>,
    /// Raw message from the service or transport.
    pub message: String,
    /// Set when the call stopped because its token was cancelled.
    pub cancelled: bool,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        GenerationError {
            status: None,
            message: message.into(),
            cancelled: false,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        GenerationError {
            status: Some(status),
            message: message.into(),
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        GenerationError {
            status: None,
            message: "Request cancelled".to_string(),
            cancelled: true,
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Generation failed ({}): {}", status, self.message),
            None => write!(f, "Generation failed: {}", self.message),
        }
    }
}

impl Error for GenerationError {}

/// A generative-image service.
///
/// Implementors should watch `cancel` where they can (e.g. by racing their
/// network future against [`CancellationToken::cancelled`]) and return
/// [`GenerationError::cancelled`] when they stop early. Ignoring the token is
/// allowed; the orchestrator discards late results either way.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate one image and return it as a `data:` URI.
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError>;

    /// Identifier of the model behind this client (e.g. `"gemini-2.5-flash-image-preview"`).
    fn model_name(&self) -> &str;
}
