//! Configuration for the studio.
//!
//! Provides the [`StudioConfig`] struct consumed by
//! [`RequestOrchestrator`](crate::RequestOrchestrator). Users construct this
//! manually; no file parsing or environment lookups happen here.
//!
//! # Example
//!
//! ```rust
//! use tryon::{ConcurrencyPolicy, StudioConfig};
//!
//! // Use the defaults (1600px, quality 92, "gemini", reject while busy)
//! let config = StudioConfig::default();
//!
//! // Or override what you need
//! let config = StudioConfig {
//!     max_side: 1024,
//!     product_name: "acme".to_string(),
//!     concurrency: ConcurrencyPolicy::Supersede,
//!     ..StudioConfig::default()
//! };
//! ```

use crate::tryon::downscale::{ImageDownscaler, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_SIDE};
use serde::{Deserialize, Serialize};

/// What to do when an operation is requested while another one is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Refuse the new request; the running operation continues untouched.
    #[default]
    Reject,
    /// Cancel the running operation and start the new one. The superseded
    /// operation's result, if it ever arrives, is discarded.
    Supersede,
}

/// Settings for a [`RequestOrchestrator`](crate::RequestOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Longest side, in pixels, of any image sent to the service.
    pub max_side: u32,
    /// JPEG quality (1-100) used when an image has to be re-encoded.
    pub jpeg_quality: u8,
    /// Prefix of downloaded file names (`<product>-styled-look.png`).
    pub product_name: String,
    /// Busy-handling policy.
    pub concurrency: ConcurrencyPolicy,
}

impl Default for StudioConfig {
    /// 1600px, quality 92, `"gemini"`, [`ConcurrencyPolicy::Reject`].
    ///
    /// ```rust
    /// use tryon::StudioConfig;
    ///
    /// let config = StudioConfig::default();
    /// assert_eq!(config.max_side, 1600);
    /// assert_eq!(config.jpeg_quality, 92);
    /// ```
    fn default() -> Self {
        Self {
            max_side: DEFAULT_MAX_SIDE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            product_name: "gemini".to_string(),
            concurrency: ConcurrencyPolicy::Reject,
        }
    }
}

impl StudioConfig {
    pub fn downscaler(&self) -> ImageDownscaler {
        ImageDownscaler::new(self.max_side, self.jpeg_quality)
    }
}
