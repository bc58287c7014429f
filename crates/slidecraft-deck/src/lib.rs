//! # slidecraft-deck
//!
//! Slide decks from generated text.
//!
//! This crate turns the loosely structured output of a text generator (or a
//! JSON array of slide objects) into a normalized [`Deck`], then renders the
//! deck as a styled 16:9 PowerPoint (PPTX) package.
//!
//! ## Features
//!
//! - **Content Parser**: blank-line segmentation, title prefix stripping,
//!   bullet glyph removal, JSON passthrough
//! - **Themes**: built-in named themes plus custom colours and solid,
//!   gradient or pattern backgrounds
//! - **Font Fit**: bullet text shrinks step by step until it fits, down to a
//!   fixed floor
//! - **Images**: optional per-slide images from an [`ImageSource`]; failures
//!   never abort a render
//! - **Watermark**: optional label on every slide
//! - **DeckConfig**: TOML configuration for all of the above
//!
//! ## Example
//!
//! ```rust,no_run
//! use slidecraft_deck::{parse, render, StyleOverrides, ThemeRegistry};
//!
//! # fn main() -> Result<(), slidecraft_deck::Error> {
//! let deck = parse("First Slide:\nAI in 2024\n• The future is now\n\nSlide 2: Uses\n• Healthcare")?;
//!
//! let registry = ThemeRegistry::builtin();
//! let style = registry.resolve("modern", &StyleOverrides::default())?;
//!
//! let pptx = render(&deck, &style, true)?;
//! pptx.write_to(pptx.suggested_file_name())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod image;
pub mod layout;
pub mod parser;
pub mod slide;
pub mod style;
pub mod writer;

// Re-exports
pub use config::DeckConfig;
pub use error::{ConfigError, Error, ImageError, ParseError, RenderError, Result, StyleError};
#[cfg(feature = "http")]
pub use http::HttpImageSource;
pub use image::{ImagePrompt, ImageSource, SlideImage};
pub use layout::{FontSizes, LayoutKind, SlideGeometry};
pub use parser::{parse, ContentInput, ContentParser, ParserConfig};
pub use slide::{Deck, SlideRecord};
pub use style::{Background, Rgb, StyleConfig, StyleOverrides, ThemeRegistry};
pub use writer::{render, DeckRenderer, RenderedDeck};

/// PPTX-related constants
pub mod constants {
    /// Widescreen 16:9 slide width in EMU (13.333" width)
    pub const WIDESCREEN_SLIDE_WIDTH_EMU: i64 = 12_192_000;

    /// Widescreen 16:9 slide height in EMU (7.5" height)
    pub const WIDESCREEN_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace (for `r:` attributes)
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Package relationships namespace (for `.rels` parts)
    pub const NS_PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Main document relationship type
    pub const REL_TYPE_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    /// Core properties relationship type
    pub const REL_TYPE_CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

    /// Extended properties relationship type
    pub const REL_TYPE_EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

    /// Presentation properties relationship type
    pub const REL_TYPE_PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Image relationship type
    pub const REL_TYPE_IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}
