//! Decorative slide images.
//!
//! Images come from an optional [`ImageSource`] collaborator. Fetching is
//! best effort: every failure turns into [`SlideImage::NoImage`] for that
//! slide and is logged, so a missing picture never aborts a render.

use crate::error::ImageError;
use crate::slide::SlideRecord;

/// Default image generation endpoint
pub const DEFAULT_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

/// Default image model
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Default image size, landscape to suit a 16:9 slide
pub const DEFAULT_IMAGE_SIZE: &str = "1792x1024";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Image formats that can be embedded in the package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect the format from magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    /// File extension used for the media part
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// MIME content type
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Image bytes ready to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Wrap raw bytes, rejecting unknown formats
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        let format = ImageFormat::sniff(&data).ok_or(ImageError::UnsupportedFormat)?;
        Ok(Self { format, data })
    }
}

/// Per-slide image outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideImage {
    Image(EmbeddedImage),
    NoImage,
}

impl SlideImage {
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Text sent to the image generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompt(String);

impl ImagePrompt {
    /// Wrap slide text in the presentation-image instruction
    pub fn new(subject: &str) -> Self {
        Self(format!(
            "Create a professional, presentation-style image for: {}. \
             Make it suitable for a business presentation, with clean and modern aesthetics.",
            subject.trim()
        ))
    }

    /// Prompt for the title slide: the title alone
    pub fn for_title_slide(record: &SlideRecord) -> Self {
        Self::new(&record.title)
    }

    /// Prompt for a content slide: title and bullets
    pub fn for_content_slide(record: &SlideRecord) -> Self {
        let mut subject = record.title.clone();
        if !record.bullets.is_empty() {
            subject.push_str(" (");
            subject.push_str(&record.bullets.join("; "));
            subject.push(')');
        }
        Self::new(&subject)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An image-generation collaborator returning raw image bytes for a prompt
pub trait ImageSource {
    /// Short name for log messages
    fn name(&self) -> &'static str;

    /// Generate an image for the prompt
    fn fetch(&self, prompt: &ImagePrompt) -> Result<Vec<u8>, ImageError>;
}

/// Ask the source for an image, absorbing every failure.
///
/// Returns [`SlideImage::NoImage`] when no source is configured, the fetch
/// fails, or the bytes are not an embeddable image.
pub fn obtain_image(source: Option<&dyn ImageSource>, prompt: &ImagePrompt) -> SlideImage {
    let Some(source) = source else {
        return SlideImage::NoImage;
    };

    match source.fetch(prompt).and_then(EmbeddedImage::from_bytes) {
        Ok(image) => {
            log::debug!(
                "Image source {} returned {} bytes ({:?})",
                source.name(),
                image.data.len(),
                image.format
            );
            SlideImage::Image(image)
        }
        Err(e) => {
            log::warn!(
                "Image source {} failed, continuing without image: {}",
                source.name(),
                e
            );
            SlideImage::NoImage
        }
    }
}
