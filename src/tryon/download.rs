//! Saving generated images.
//!
//! A [`Download`] is derived from a result data URI: the bytes are decoded, the
//! file extension comes from the embedded MIME type, and the file name follows
//! `<product>-styled-look[-upscaled].<ext>`. A [`DownloadSink`] performs the
//! actual save; [`DirectoryDownloadSink`] writes into a directory.

use crate::tryon::data_uri::{extension_for_mime, parse_data_uri, DataUriError};
use log::info;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while preparing or saving a download.
#[derive(Debug)]
pub enum DownloadError {
    /// The result could not be decoded.
    InvalidDataUri(DataUriError),
    /// The sink failed to write.
    Io(io::Error),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::InvalidDataUri(err) => write!(f, "Cannot download result: {}", err),
            DownloadError::Io(err) => write!(f, "Failed to save download: {}", err),
        }
    }
}

impl Error for DownloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DownloadError::InvalidDataUri(err) => Some(err),
            DownloadError::Io(err) => Some(err),
        }
    }
}

impl From<DataUriError> for DownloadError {
    fn from(err: DataUriError) -> Self {
        DownloadError::InvalidDataUri(err)
    }
}

impl From<io::Error> for DownloadError {
    fn from(err: io::Error) -> Self {
        DownloadError::Io(err)
    }
}

/// A file ready to be handed to a [`DownloadSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Build a download for `data_uri`.
    ///
    /// ```
    /// use tryon::download::Download;
    ///
    /// let download = Download::from_data_uri("gemini", "data:image/jpeg;base64,/9j/", true).unwrap();
    /// assert_eq!(download.file_name, "gemini-styled-look-upscaled.jpeg");
    /// ```
    pub fn from_data_uri(product: &str, data_uri: &str, upscaled: bool) -> Result<Self, DownloadError> {
        let decoded = parse_data_uri(data_uri)?;
        let file_name = download_file_name(product, &decoded.mime_type, upscaled);
        Ok(Download {
            file_name,
            mime_type: decoded.mime_type,
            bytes: decoded.bytes,
        })
    }
}

/// `<product>-styled-look[-upscaled].<ext>` for a result of type `mime_type`.
pub fn download_file_name(product: &str, mime_type: &str, upscaled: bool) -> String {
    let suffix = if upscaled { "-upscaled" } else { "" };
    format!(
        "{}-styled-look{}.{}",
        product,
        suffix,
        extension_for_mime(mime_type)
    )
}

/// Destination for downloads.
pub trait DownloadSink: Send + Sync {
    /// Save the file and return where it ended up.
    fn save(&self, download: &Download) -> Result<PathBuf, DownloadError>;
}

/// Writes downloads into a directory, creating it on first use.
///
/// An existing file with the same name is overwritten, which mirrors what a
/// browser's "save as" does with the same suggested name.
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryDownloadSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn save(&self, download: &Download) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&download.file_name);
        fs::write(&path, &download.bytes)?;
        info!(
            "DirectoryDownloadSink: saved {} ({} bytes)",
            path.display(),
            download.bytes.len()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tryon::data_uri::encode_data_uri;

    #[test]
    fn file_names_follow_pattern() {
        assert_eq!(download_file_name("gemini", "image/png", false), "gemini-styled-look.png");
        assert_eq!(
            download_file_name("gemini", "image/webp", true),
            "gemini-styled-look-upscaled.webp"
        );
        assert_eq!(download_file_name("acme", "image/jpeg", false), "acme-styled-look.jpeg");
        assert_eq!(download_file_name("acme", "", false), "acme-styled-look.png");
    }

    #[test]
    fn from_data_uri_decodes_bytes() {
        let uri = encode_data_uri("image/png", &[1, 2, 3, 4]);
        let download = Download::from_data_uri("gemini", &uri, false).unwrap();
        assert_eq!(download.bytes, vec![1, 2, 3, 4]);
        assert_eq!(download.mime_type, "image/png");
        assert_eq!(download.file_name, "gemini-styled-look.png");
    }

    #[test]
    fn invalid_uri_is_rejected() {
        assert!(matches!(
            Download::from_data_uri("gemini", "not-a-uri", false),
            Err(DownloadError::InvalidDataUri(_))
        ));
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryDownloadSink::new(dir.path().join("downloads"));
        let download = Download {
            file_name: "gemini-styled-look.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![7; 16],
        };
        let path = sink.save(&download).unwrap();
        assert_eq!(path, dir.path().join("downloads").join("gemini-styled-look.png"));
        assert_eq!(fs::read(&path).unwrap(), vec![7; 16]);
    }
}
