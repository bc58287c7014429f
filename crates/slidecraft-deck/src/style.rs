//! Themes and style resolution.
//!
//! A [`ThemeRegistry`] is built once (built-in themes plus any themes from
//! configuration) and is immutable afterwards. Rendering parameters for a
//! single deck come from [`ThemeRegistry::resolve`]: the named theme's
//! defaults, overlaid field by field with the caller's [`StyleOverrides`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, StyleError};

/// Name of the theme used when a requested theme does not exist
pub const DEFAULT_THEME: &str = "default";

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a colour from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`
    pub fn from_hex(value: &str) -> Result<Self, RenderError> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RenderError::invalid_color(value));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| RenderError::invalid_color(value))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case hex without `#`, as DrawingML `srgbClr` expects
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Background variant names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Pattern,
}

impl BackgroundKind {
    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Pattern => "pattern",
        }
    }
}

impl FromStr for BackgroundKind {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" | "color" | "plain" => Ok(Self::Solid),
            "gradient" | "linear" => Ok(Self::Gradient),
            "pattern" | "patterned" => Ok(Self::Pattern),
            _ => Err(StyleError::UnknownBackground {
                name: s.to_string(),
            }),
        }
    }
}

/// Slide background fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Single colour fill
    Solid { color: Rgb },

    /// Two-stop linear gradient, top to bottom
    Gradient { color1: Rgb, color2: Rgb },

    /// Two-colour pattern fill (foreground, background)
    Pattern { color1: Rgb, color2: Rgb },
}

impl Background {
    /// Build a background of the given kind from two colours.
    ///
    /// `Solid` uses only the first colour.
    pub fn from_kind(kind: BackgroundKind, color1: Rgb, color2: Rgb) -> Self {
        match kind {
            BackgroundKind::Solid => Self::Solid { color: color1 },
            BackgroundKind::Gradient => Self::Gradient { color1, color2 },
            BackgroundKind::Pattern => Self::Pattern { color1, color2 },
        }
    }

    pub fn kind(&self) -> BackgroundKind {
        match self {
            Self::Solid { .. } => BackgroundKind::Solid,
            Self::Gradient { .. } => BackgroundKind::Gradient,
            Self::Pattern { .. } => BackgroundKind::Pattern,
        }
    }

    /// The two colours of this fill (a solid fill repeats its colour)
    pub fn colors(&self) -> (Rgb, Rgb) {
        match *self {
            Self::Solid { color } => (color, color),
            Self::Gradient { color1, color2 } | Self::Pattern { color1, color2 } => {
                (color1, color2)
            }
        }
    }
}

/// Resolved rendering parameters for one deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    /// Slide title colour
    pub title_color: Rgb,

    /// Body text colour (subtitle and bullets)
    pub text_color: Rgb,

    /// Background fill applied to every slide
    pub background: Background,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            title_color: Rgb::new(0x1F, 0x29, 0x37),
            text_color: Rgb::new(0x37, 0x41, 0x51),
            background: Background::Solid {
                color: Rgb::new(0xFF, 0xFF, 0xFF),
            },
        }
    }
}

/// Caller-supplied custom style fields.
///
/// Every field is optional; present fields win over the theme defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    #[serde(alias = "titleColor")]
    pub title_color: Option<String>,

    #[serde(alias = "textColor")]
    pub text_color: Option<String>,

    /// Background variant name: `solid`, `gradient` or `pattern`
    #[serde(alias = "backgroundType")]
    pub background: Option<String>,

    #[serde(alias = "backgroundColor", alias = "backgroundColor1")]
    pub background_color1: Option<String>,

    #[serde(alias = "backgroundColor2")]
    pub background_color2: Option<String>,
}

impl StyleOverrides {
    /// Check whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay these fields on a base style.
    ///
    /// An unknown background variant keeps the base background; a malformed
    /// colour is an error.
    pub fn apply(&self, base: StyleConfig) -> Result<StyleConfig, RenderError> {
        let mut style = base;

        if let Some(color) = &self.title_color {
            style.title_color = Rgb::from_hex(color)?;
        }
        if let Some(color) = &self.text_color {
            style.text_color = Rgb::from_hex(color)?;
        }

        let (base1, base2) = base.background.colors();
        let color1 = parse_optional(self.background_color1.as_deref())?.unwrap_or(base1);
        let color2 = parse_optional(self.background_color2.as_deref())?.unwrap_or(base2);

        let kind = match self.background.as_deref().map(str::parse::<BackgroundKind>) {
            None => Some(base.background.kind()),
            Some(Ok(kind)) => Some(kind),
            Some(Err(err)) => {
                log::warn!(
                    "{} ({}); keeping theme background",
                    err,
                    err.code()
                );
                None
            }
        };

        if let Some(kind) = kind {
            style.background = Background::from_kind(kind, color1, color2);
        }

        Ok(style)
    }

    /// Layer these overrides on top of `base`: fields set here win
    pub fn layered_over(&self, base: &StyleOverrides) -> StyleOverrides {
        StyleOverrides {
            title_color: self.title_color.clone().or_else(|| base.title_color.clone()),
            text_color: self.text_color.clone().or_else(|| base.text_color.clone()),
            background: self.background.clone().or_else(|| base.background.clone()),
            background_color1: self
                .background_color1
                .clone()
                .or_else(|| base.background_color1.clone()),
            background_color2: self
                .background_color2
                .clone()
                .or_else(|| base.background_color2.clone()),
        }
    }
}

fn parse_optional(value: Option<&str>) -> Result<Option<Rgb>, RenderError> {
    value.map(Rgb::from_hex).transpose()
}

/// Immutable table of named themes
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, StyleConfig>,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThemeRegistry {
    /// Registry with the built-in themes
    pub fn builtin() -> Self {
        let themes = [
            (DEFAULT_THEME, StyleConfig::default()),
            (
                "modern",
                StyleConfig {
                    title_color: Rgb::new(0xFF, 0xFF, 0xFF),
                    text_color: Rgb::new(0xE2, 0xE8, 0xF0),
                    background: Background::Gradient {
                        color1: Rgb::new(0x0F, 0x17, 0x2A),
                        color2: Rgb::new(0x1E, 0x3A, 0x8A),
                    },
                },
            ),
            (
                "dark",
                StyleConfig {
                    title_color: Rgb::new(0xF9, 0xFA, 0xFB),
                    text_color: Rgb::new(0xD1, 0xD5, 0xDB),
                    background: Background::Solid {
                        color: Rgb::new(0x11, 0x18, 0x27),
                    },
                },
            ),
            (
                "corporate",
                StyleConfig {
                    title_color: Rgb::new(0x0B, 0x3D, 0x91),
                    text_color: Rgb::new(0x33, 0x41, 0x55),
                    background: Background::Solid {
                        color: Rgb::new(0xF8, 0xFA, 0xFC),
                    },
                },
            ),
            (
                "nature",
                StyleConfig {
                    title_color: Rgb::new(0x1B, 0x5E, 0x20),
                    text_color: Rgb::new(0x2E, 0x7D, 0x32),
                    background: Background::Gradient {
                        color1: Rgb::new(0xE8, 0xF5, 0xE9),
                        color2: Rgb::new(0xA5, 0xD6, 0xA7),
                    },
                },
            ),
            (
                "blueprint",
                StyleConfig {
                    title_color: Rgb::new(0xFF, 0xFF, 0xFF),
                    text_color: Rgb::new(0xDB, 0xEA, 0xFE),
                    background: Background::Pattern {
                        color1: Rgb::new(0x24, 0x4A, 0x75),
                        color2: Rgb::new(0x1E, 0x3A, 0x5F),
                    },
                },
            ),
        ];

        Self {
            themes: themes
                .into_iter()
                .map(|(name, style)| (name.to_string(), style))
                .collect(),
        }
    }

    /// Add or replace a named theme
    pub fn with_theme(mut self, name: impl AsRef<str>, style: StyleConfig) -> Self {
        self.themes
            .insert(name.as_ref().trim().to_ascii_lowercase(), style);
        self
    }

    /// Look up a theme by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Result<&StyleConfig, StyleError> {
        self.themes
            .get(&name.trim().to_ascii_lowercase())
            .ok_or_else(|| StyleError::UnknownTheme {
                name: name.to_string(),
            })
    }

    /// The fallback theme
    pub fn default_style(&self) -> StyleConfig {
        self.themes
            .get(DEFAULT_THEME)
            .copied()
            .unwrap_or_default()
    }

    /// Theme names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Iterate over all themes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleConfig)> {
        self.themes.iter().map(|(name, style)| (name.as_str(), style))
    }

    /// Resolve the style for one deck.
    ///
    /// An unknown theme falls back to [`DEFAULT_THEME`] with a warning.
    pub fn resolve(
        &self,
        theme: &str,
        overrides: &StyleOverrides,
    ) -> Result<StyleConfig, RenderError> {
        let base = match self.lookup(theme) {
            Ok(style) => *style,
            Err(err) => {
                log::warn!(
                    "{} ({}); falling back to '{}'",
                    err,
                    err.code(),
                    DEFAULT_THEME
                );
                self.default_style()
            }
        };

        overrides.apply(base)
    }
}
