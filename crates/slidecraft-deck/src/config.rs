//! Deck configuration file.
//!
//! A `DeckConfig` collects every tunable of the pipeline in one TOML
//! document. All sections and fields are optional:
//!
//! ```toml
//! [meta]
//! author = "Acme Corp"
//! locale = "en-GB"
//!
//! [parser]
//! prefix_patterns = ['(?i)^slide\s+\d+\s*[:.\-]\s*']
//!
//! [fonts]
//! bullet_base = 28
//! bullet_min = 14
//!
//! [watermark]
//! text = "Draft"
//!
//! [images]
//! enabled = true
//! model = "dall-e-3"
//!
//! [style]
//! theme = "modern"
//! title_color = "#FFD700"
//!
//! [themes.sunset]
//! background = "gradient"
//! background_color1 = "FF7E5F"
//! background_color2 = "FEB47B"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ParseError, RenderError};
use crate::image::{DEFAULT_IMAGES_URL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::layout::FontSizes;
use crate::parser::{ContentParser, ParserConfig};
use crate::style::{StyleConfig, StyleOverrides, ThemeRegistry, DEFAULT_THEME};
use crate::writer::{DeckRenderer, DEFAULT_AUTHOR, DEFAULT_LOCALE, DEFAULT_WATERMARK_TEXT};

#[cfg(feature = "http")]
use crate::error::ImageError;
#[cfg(feature = "http")]
use crate::http::HttpImageSource;

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Document metadata
    #[serde(default)]
    pub meta: DeckMeta,

    /// Title prefix rules
    #[serde(default)]
    pub parser: ParserConfig,

    /// Font sizes and fitting
    #[serde(default)]
    pub fonts: FontSizes,

    /// Watermark label
    #[serde(default)]
    pub watermark: WatermarkConfig,

    /// Image generation service
    #[serde(default)]
    pub images: ImageConfig,

    /// Theme selection and custom overrides
    #[serde(default)]
    pub style: StyleSection,

    /// Extra named themes, each layered over the default theme
    #[serde(default)]
    pub themes: BTreeMap<String, StyleOverrides>,
}

/// Document metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckMeta {
    /// Author written to the document properties
    #[serde(default = "default_author")]
    pub author: String,

    /// Locale code (e.g., "en-US", "it-IT")
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

/// Watermark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Label text
    #[serde(default = "default_watermark_text")]
    pub text: String,
}

fn default_watermark_text() -> String {
    DEFAULT_WATERMARK_TEXT.to_string()
}

/// Image generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Fetch images for slides
    #[serde(default)]
    pub enabled: bool,

    /// Generation endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Requested image size
    #[serde(default = "default_size")]
    pub size: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_IMAGES_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_size() -> String {
    DEFAULT_IMAGE_SIZE.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Theme name plus field overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSection {
    /// Named theme
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Custom colours and background
    #[serde(flatten)]
    pub overrides: StyleOverrides,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for DeckMeta {
    fn default() -> Self {
        Self {
            author: default_author(),
            locale: default_locale(),
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: default_watermark_text(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            size: default_size(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            overrides: StyleOverrides::default(),
        }
    }
}

impl DeckConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_content: &str) -> Result<Self, ConfigError> {
        let config: DeckConfig = toml::from_str(toml_content)?;
        Ok(config)
    }

    /// Built-in themes plus the `[themes.*]` tables
    pub fn theme_registry(&self) -> Result<ThemeRegistry, RenderError> {
        let mut registry = ThemeRegistry::builtin();
        for (name, overrides) in &self.themes {
            let style = overrides.apply(registry.default_style())?;
            registry = registry.with_theme(name, style);
        }
        Ok(registry)
    }

    /// Resolve the `[style]` section against a registry
    pub fn resolve_style(&self, registry: &ThemeRegistry) -> Result<StyleConfig, RenderError> {
        registry.resolve(&self.style.theme, &self.style.overrides)
    }

    /// Parser with the configured prefix rules
    pub fn content_parser(&self) -> Result<ContentParser, ParseError> {
        ContentParser::with_config(&self.parser)
    }

    /// Renderer with the configured fonts, metadata and watermark.
    ///
    /// No image source is attached; see [`DeckConfig::http_image_source`].
    pub fn renderer(&self) -> DeckRenderer {
        DeckRenderer::new()
            .with_fonts(self.fonts.clone())
            .with_locale(&self.meta.locale)
            .with_author(&self.meta.author)
            .with_watermark_text(&self.watermark.text)
    }

    /// HTTP image client for the `[images]` section.
    ///
    /// The API key is read from the configured environment variable, if set.
    #[cfg(feature = "http")]
    pub fn http_image_source(&self) -> Result<HttpImageSource, ImageError> {
        let images = &self.images;
        let mut source = HttpImageSource::with_url(&images.endpoint)?
            .with_model(&images.model)
            .with_size(&images.size)
            .with_timeout(std::time::Duration::from_secs(images.timeout_secs))?;

        match std::env::var(&images.api_key_env) {
            Ok(key) if !key.trim().is_empty() => source = source.with_api_key(key.trim()),
            _ => log::debug!("{} not set; image requests are unauthenticated", images.api_key_env),
        }

        Ok(source)
    }
}
