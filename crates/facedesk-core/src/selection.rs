//! Local image selection and preview.

use crate::error::SelectError;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// An image chosen for upload. Held in memory only for the current attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Open an image from disk.
    ///
    /// This is the file picker filter: the extension must name an image format.
    /// The contents are not decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SelectError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let format = ImageFormat::from_path(path)
            .map_err(|_| SelectError::NotAnImage(display.clone()))?;

        let bytes = std::fs::read(path).map_err(|source| SelectError::Io {
            path: display.clone(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(display);

        tracing::debug!(file = %file_name, size = bytes.len(), ?format, "image selected");

        Ok(Self {
            file_name,
            mime: format.to_mime_type().to_string(),
            bytes,
        })
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Build the preview shown while the file is selected.
    pub fn preview(&self) -> Preview {
        // Header-only read; bytes that are not a decodable image have no dimensions.
        let dimensions = ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());

        Preview {
            file_name: self.file_name.clone(),
            size_bytes: self.bytes.len(),
            dimensions,
        }
    }
}

/// What the user sees of a selected file before submitting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub size_bytes: usize,
    /// Pixel width and height, if the image header could be read.
    pub dimensions: Option<(u32, u32)>,
}

impl std::fmt::Display for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.dimensions {
            Some((w, h)) => write!(f, "{} ({w}x{h}, {} bytes)", self.file_name, self.size_bytes),
            None => write!(f, "{} ({} bytes)", self.file_name, self.size_bytes),
        }
    }
}
