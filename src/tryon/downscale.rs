//! Client-side image downscaling before upload.
//!
//! [`ImageDownscaler`] caps the longest side of an image, re-encoding it as JPEG
//! when it has to shrink it. Images already within the bound come back as the
//! very same payload, with no re-encode and no quality loss.
//!
//! Decoding walks an ordered list of [`DecodeStrategy`] implementations and takes
//! the first that succeeds. The default chain trusts the declared MIME type first
//! and falls back to sniffing the magic bytes, which covers files whose MIME type
//! is wrong or missing.
//!
//! ```
//! use tryon::downscale::ImageDownscaler;
//! use tryon::image_asset::ImagePayload;
//! use image::{DynamicImage, ImageFormat};
//! use std::io::Cursor;
//!
//! let mut png = Cursor::new(Vec::new());
//! DynamicImage::new_rgb8(3200, 1600).write_to(&mut png, ImageFormat::Png).unwrap();
//! let payload = ImagePayload::new(png.into_inner(), "image/png");
//!
//! let resized = ImageDownscaler::default().downscale(&payload).unwrap();
//! assert_eq!(resized.mime_type(), "image/jpeg");
//! ```

use crate::tryon::image_asset::{ImageAsset, ImagePayload};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageFormat};
use log::debug;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Longest side, in pixels, an uploaded image may have.
pub const DEFAULT_MAX_SIDE: u32 = 1600;

/// JPEG quality (0-100) used when an image has to be re-encoded.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// MIME type of every re-encoded image.
pub const REENCODED_MIME_TYPE: &str = "image/jpeg";

/// Errors produced while downscaling.
#[derive(Debug, Clone)]
pub enum DownscaleError {
    /// Every decode strategy failed; carries the last strategy's failure.
    Decode { strategy: String, message: String },
    /// The resized bitmap could not be encoded.
    Encode(String),
    /// The blocking task running the resize did not complete.
    Join(String),
}

impl fmt::Display for DownscaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownscaleError::Decode { strategy, message } => {
                write!(f, "Failed to decode image ({}): {}", strategy, message)
            }
            DownscaleError::Encode(msg) => write!(f, "Failed to encode image: {}", msg),
            DownscaleError::Join(msg) => write!(f, "Image task failed: {}", msg),
        }
    }
}

impl Error for DownscaleError {}

/// One way of turning a payload into a bitmap.
pub trait DecodeStrategy: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn decode(&self, payload: &ImagePayload) -> Result<DynamicImage, String>;
}

/// Decodes with the format named by the payload's MIME type.
pub struct DeclaredFormatDecoder;

impl DecodeStrategy for DeclaredFormatDecoder {
    fn name(&self) -> &str {
        "declared-format"
    }

    fn decode(&self, payload: &ImagePayload) -> Result<DynamicImage, String> {
        let format = ImageFormat::from_mime_type(payload.mime_type())
            .ok_or_else(|| format!("unsupported MIME type '{}'", payload.mime_type()))?;
        image::load_from_memory_with_format(payload.bytes(), format).map_err(|e| e.to_string())
    }
}

/// Decodes by guessing the format from the leading magic bytes.
pub struct SniffedFormatDecoder;

impl DecodeStrategy for SniffedFormatDecoder {
    fn name(&self) -> &str {
        "sniffed-format"
    }

    fn decode(&self, payload: &ImagePayload) -> Result<DynamicImage, String> {
        image::load_from_memory(payload.bytes()).map_err(|e| e.to_string())
    }
}

/// Reduces images to a maximum side length.
#[derive(Clone)]
pub struct ImageDownscaler {
    max_side: u32,
    quality: u8,
    strategies: Vec<Arc<dyn DecodeStrategy>>,
}

impl Default for ImageDownscaler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIDE, DEFAULT_JPEG_QUALITY)
    }
}

impl fmt::Debug for ImageDownscaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDownscaler")
            .field("max_side", &self.max_side)
            .field("quality", &self.quality)
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ImageDownscaler {
    /// Create a downscaler with the default decode chain.
    ///
    /// `max_side` is clamped to at least 1 and `quality` to `1..=100`.
    pub fn new(max_side: u32, quality: u8) -> Self {
        ImageDownscaler {
            max_side: max_side.max(1),
            quality: quality.clamp(1, 100),
            strategies: vec![Arc::new(DeclaredFormatDecoder), Arc::new(SniffedFormatDecoder)],
        }
    }

    /// Replace the decode chain. Strategies are tried in the given order.
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn DecodeStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn max_side(&self) -> u32 {
        self.max_side
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Downscale a payload so that its longest side is at most `max_side`.
    pub fn downscale(&self, payload: &ImagePayload) -> Result<ImagePayload, DownscaleError> {
        let bitmap = self.decode(payload)?;
        let (width, height) = (bitmap.width(), bitmap.height());

        if width.max(height) <= self.max_side {
            debug!(
                "ImageDownscaler: {}x{} within {}px, payload kept as-is",
                width, height, self.max_side
            );
            return Ok(payload.clone());
        }

        let (new_width, new_height) = scaled_dimensions(width, height, self.max_side);
        let resized = bitmap.resize_exact(new_width, new_height, FilterType::Lanczos3);
        drop(bitmap);

        let rgb = resized.to_rgb8();
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| DownscaleError::Encode(e.to_string()))?;

        debug!(
            "ImageDownscaler: {}x{} -> {}x{} ({} -> {} bytes)",
            width,
            height,
            new_width,
            new_height,
            payload.len(),
            buffer.len()
        );
        Ok(ImagePayload::new(buffer, REENCODED_MIME_TYPE))
    }

    /// Downscale an asset's payload, keeping its id and preview.
    pub fn downscale_asset(&self, asset: &ImageAsset) -> Result<ImageAsset, DownscaleError> {
        let payload = self.downscale(&asset.payload)?;
        Ok(asset.with_payload(payload))
    }

    fn decode(&self, payload: &ImagePayload) -> Result<DynamicImage, DownscaleError> {
        let mut last_failure = DownscaleError::Decode {
            strategy: "none".to_string(),
            message: "no decode strategy configured".to_string(),
        };
        for strategy in &self.strategies {
            match strategy.decode(payload) {
                Ok(bitmap) => return Ok(bitmap),
                Err(message) => {
                    debug!(
                        "ImageDownscaler: {} decode failed, trying next: {}",
                        strategy.name(),
                        message
                    );
                    last_failure = DownscaleError::Decode {
                        strategy: strategy.name().to_string(),
                        message,
                    };
                }
            }
        }
        Err(last_failure)
    }
}

/// Dimensions after scaling the longest side down to `max_side`.
///
/// Sides are rounded to the nearest pixel and never drop below 1.
pub fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let scale_side = |side: u32| -> u32 {
        if side == longest {
            max_side
        } else {
            ((side as f64 * scale).round() as u32).max(1)
        }
    };
    (scale_side(width), scale_side(height))
}
