//! slidecraft CLI - Command-line interface library
//!
//! This library provides the CLI functionality for slidecraft:
//! - Build: Generated text to a styled PPTX deck
//! - Parse: Show how generated text is split into slides
//! - Themes: List the available themes
//!
//! # Library Usage
//!
//! ```ignore
//! use slidecraft_cli::{build_command, BuildOptions};
//!
//! let options = BuildOptions::new("slides.txt").with_watermark(true);
//! let written = build_command(&options)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build a deck from generator output
//! slidecraft build slides.txt --theme modern --output deck.pptx
//!
//! # Free-tier style: watermark and at most 5 slides
//! slidecraft build - --watermark --max-slides 5 < slides.txt
//!
//! # Inspect the parsed slides
//! slidecraft parse slides.txt --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{build_command, parse_command, run_cli, themes_command};
pub use app::{format_deck, format_themes, BuildOptions, OutputFormat};
