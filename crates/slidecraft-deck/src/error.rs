//! Error types for deck parsing and rendering.
//!
//! Parsing and rendering fail with distinct types so that callers can map
//! them to distinct user-facing messages. Style and image faults have their
//! own types too, but the pipeline absorbs them locally.

use thiserror::Error;

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised by the content parser
#[derive(Error, Debug)]
pub enum ParseError {
    /// Nothing usable in the generated content
    #[error("failed to generate presentation content: no slide content found")]
    EmptyContent,

    /// A configured title prefix pattern is not a valid regex
    #[error("Invalid title prefix pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ParseError {
    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyContent => "PARSE001",
            Self::InvalidPattern { .. } => "PARSE002",
        }
    }
}

/// Errors raised while resolving a theme or background variant.
///
/// [`crate::style::ThemeRegistry::resolve`] never returns these; it logs
/// them and falls back to the theme defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// No theme registered under this name
    #[error("Unknown theme: {name}")]
    UnknownTheme { name: String },

    /// Background variant name not recognised
    #[error("Unknown background variant: {name}")]
    UnknownBackground { name: String },
}

impl StyleError {
    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTheme { .. } => "STYLE001",
            Self::UnknownBackground { .. } => "STYLE002",
        }
    }
}

/// Errors raised by the deck renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// Colour value is not a 6-digit hex triple
    #[error("Invalid color value '{value}': expected RRGGBB hex")]
    InvalidColor { value: String },

    /// Deck has no slides to render
    #[error("Deck has no slides")]
    EmptyDeck,

    /// XML generation error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Create an invalid color error
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidColor { .. } => "RENDER001",
            Self::EmptyDeck => "RENDER005",
            Self::Xml(_) => "RENDER002",
            Self::Zip(_) => "RENDER003",
            Self::Io(_) => "RENDER004",
        }
    }
}

/// Errors raised by an image source.
///
/// The renderer swallows these per slide.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Transport failure talking to the image service
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Image service answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response did not contain usable image data
    #[error("Invalid image response: {0}")]
    InvalidResponse(String),

    /// Bytes are not a PNG, JPEG or GIF image
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// No image source configured
    #[error("Image source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading a deck configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not readable
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Any error produced by this crate
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
