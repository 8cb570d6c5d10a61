use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Directory under the media root holding recipe images
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Debug, Error)]
pub enum ImageError {
    /// The upload is not an image we accept; carries a client-facing message
    #[error("{0}")]
    Invalid(String),

    #[error("File too large. Maximum size is {0} bytes")]
    TooLarge(usize),

    #[error("Image storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Files under the media root, published below `url_prefix`
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.root.clone(), config.url_prefix.clone(), config.max_image_bytes)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    /// Detect the format from magic bytes and make sure the whole image decodes.
    pub fn validate(&self, data: &[u8]) -> Result<ImageFormat, ImageError> {
        if data.len() > self.max_bytes {
            return Err(ImageError::TooLarge(self.max_bytes));
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageError::Invalid(format!("Failed to read image: {}", e)))?;

        let format = reader.format().ok_or_else(|| {
            ImageError::Invalid(
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
                    .to_string(),
            )
        })?;

        if !ALLOWED_FORMATS.contains(&format) {
            return Err(ImageError::Invalid(format!(
                "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
                format
            )));
        }

        reader
            .decode()
            .map_err(|e| ImageError::Invalid(format!("Failed to decode image: {}", e)))?;
        Ok(format)
    }

    /// `uploads/recipe/<uuid>.<ext>`. The uploaded filename's extension is kept
    /// only when it names the detected format, so stored files are always
    /// served as the image type they contain.
    pub fn recipe_image_path(original_filename: Option<&str>, format: ImageFormat) -> String {
        let known = format.extensions_str();
        let ext = original_filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| known.iter().any(|k| *k == ext.as_str()))
            .unwrap_or_else(|| known.first().copied().unwrap_or("img").to_string());

        format!("{}/{}.{}", RECIPE_IMAGE_DIR, Uuid::new_v4(), ext)
    }

    pub async fn save(&self, relative: &str, data: &[u8]) -> Result<(), ImageError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), ImageError> {
        let path = self.root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Image already missing: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).is_file()
    }
}
