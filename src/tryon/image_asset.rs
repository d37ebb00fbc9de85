//! Image values held by the studio and the preview handles that display them.
//!
//! An [`ImageAsset`] pairs a binary [`ImagePayload`] with a [`PreviewHandle`] and a
//! unique id. Assets coming from user selection get an object-URL style handle
//! issued by a [`PreviewRegistry`]. That handle is a process-scoped resource and
//! must be released when the asset is replaced or discarded. Assets rebuilt from
//! a generation result reuse the result's data URI as their preview and own
//! nothing that needs releasing.

use crate::tryon::data_uri::{encode_data_uri, parse_data_uri, DataUriError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Immutable image bytes tagged with a MIME type.
///
/// Cloning shares the underlying buffer, so an unchanged payload can be handed
/// back to a caller without copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        ImagePayload {
            bytes: Arc::from(bytes),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both payloads share the same buffer (not merely equal bytes).
    pub fn shares_buffer_with(&self, other: &ImagePayload) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        encode_data_uri(&self.mime_type, &self.bytes)
    }
}

/// A locally resolvable display reference for an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "href", rename_all = "snake_case")]
pub enum PreviewHandle {
    /// Issued by a [`PreviewRegistry`]; must be released.
    ObjectUrl(String),
    /// Self-contained data URI; nothing to release.
    DataUri(String),
}

impl PreviewHandle {
    pub fn href(&self) -> &str {
        match self {
            PreviewHandle::ObjectUrl(href) | PreviewHandle::DataUri(href) => href,
        }
    }

    pub fn needs_release(&self) -> bool {
        matches!(self, PreviewHandle::ObjectUrl(_))
    }
}

/// An image the studio holds: payload, preview and a unique id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: String,
    pub payload: ImagePayload,
    pub preview: PreviewHandle,
}

impl ImageAsset {
    /// Rebuild an asset from a generation result.
    ///
    /// The bytes are those encoded in the URI, the id is fresh, and the URI
    /// itself serves as the preview.
    pub fn from_data_uri(data_uri: &str) -> Result<Self, DataUriError> {
        let decoded = parse_data_uri(data_uri)?;
        let mime_type = if decoded.mime_type.is_empty() {
            "image/png".to_string()
        } else {
            decoded.mime_type
        };
        Ok(ImageAsset {
            id: Uuid::new_v4().to_string(),
            payload: ImagePayload::new(decoded.bytes, mime_type),
            preview: PreviewHandle::DataUri(data_uri.to_string()),
        })
    }

    /// Same asset identity and preview with a different payload.
    pub fn with_payload(&self, payload: ImagePayload) -> Self {
        ImageAsset {
            id: self.id.clone(),
            payload,
            preview: self.preview.clone(),
        }
    }
}

/// Issues object-URL preview handles and tracks the ones still alive.
///
/// The registry is the crate's stand-in for a browser's object-URL table:
/// every handle created here is outstanding until released, and
/// [`release_all`](PreviewRegistry::release_all) is the session-teardown sweep.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<String>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a user-selected image into an asset with a freshly issued preview.
    pub fn create_asset(&self, payload: ImagePayload) -> ImageAsset {
        let id = Uuid::new_v4().to_string();
        let href = format!("blob:tryon/{}", Uuid::new_v4());
        self.lock().insert(href.clone());
        ImageAsset {
            id,
            payload,
            preview: PreviewHandle::ObjectUrl(href),
        }
    }

    /// Release one handle. Returns `false` if it was not outstanding.
    pub fn release(&self, handle: &PreviewHandle) -> bool {
        match handle {
            PreviewHandle::ObjectUrl(href) => self.lock().remove(href),
            PreviewHandle::DataUri(_) => false,
        }
    }

    /// Release every outstanding handle; returns how many there were.
    pub fn release_all(&self) -> usize {
        let mut live = self.lock();
        let count = live.len();
        live.clear();
        count
    }

    pub fn outstanding(&self) -> usize {
        self.lock().len()
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        match handle {
            PreviewHandle::ObjectUrl(href) => self.lock().contains(href),
            PreviewHandle::DataUri(_) => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set is still a valid set of strings.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_and_releases_handles() {
        let registry = PreviewRegistry::new();
        let a = registry.create_asset(ImagePayload::new(vec![1, 2, 3], "image/png"));
        let b = registry.create_asset(ImagePayload::new(vec![4, 5], "image/jpeg"));
        assert_ne!(a.id, b.id);
        assert_eq!(registry.outstanding(), 2);

        assert!(registry.release(&a.preview));
        assert!(!registry.release(&a.preview));
        assert!(!registry.is_live(&a.preview));
        assert!(registry.is_live(&b.preview));

        assert_eq!(registry.release_all(), 1);
        assert_eq!(registry.outstanding(), 0);
    }

    #[test]
    fn asset_from_data_uri_keeps_bytes_with_fresh_id() {
        let uri = encode_data_uri("image/webp", &[9, 8, 7]);
        let first = ImageAsset::from_data_uri(&uri).unwrap();
        let second = ImageAsset::from_data_uri(&uri).unwrap();

        assert_eq!(first.payload.bytes(), &[9, 8, 7]);
        assert_eq!(first.payload.mime_type(), "image/webp");
        assert_eq!(first.preview, PreviewHandle::DataUri(uri.clone()));
        assert!(!first.preview.needs_release());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn with_payload_keeps_identity() {
        let registry = PreviewRegistry::new();
        let asset = registry.create_asset(ImagePayload::new(vec![0; 4], "image/png"));
        let swapped = asset.with_payload(ImagePayload::new(vec![1; 2], "image/jpeg"));
        assert_eq!(swapped.id, asset.id);
        assert_eq!(swapped.preview, asset.preview);
        assert_eq!(swapped.payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn clones_share_the_buffer() {
        let payload = ImagePayload::new(vec![1, 2, 3], "image/png");
        let copy = payload.clone();
        assert!(copy.shares_buffer_with(&payload));
        let rebuilt = ImagePayload::new(vec![1, 2, 3], "image/png");
        assert!(!rebuilt.shares_buffer_with(&payload));
        assert_eq!(rebuilt, payload);
    }
}
