//! Slide data structures.
//!
//! This module defines the normalized slide model produced by the parser
//! and consumed by the renderer.

use serde::{Deserialize, Serialize};

/// One slide's normalized content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Slide title, never empty after normalization
    pub title: String,

    /// Subtitle (only rendered on the title slide)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Bullet points in display order
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl SlideRecord {
    /// Create a record with a title and no body
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Create a title-slide record
    pub fn title_slide(title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            title: title.into(),
            subtitle,
            bullets: Vec::new(),
        }
    }

    /// Create a content-slide record
    pub fn content_slide<I, S>(title: impl Into<String>, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            subtitle: None,
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a bullet
    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.bullets.push(bullet.into());
        self
    }

    /// Plain text of the whole slide, title first
    pub fn as_plain_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        if let Some(subtitle) = &self.subtitle {
            parts.push(subtitle);
        }
        parts.extend(self.bullets.iter().map(String::as_str));
        parts.join("\n")
    }
}

/// Ordered list of slide records.
///
/// Index 0 renders with the title layout, the rest with the content layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    /// All slides in the deck
    pub slides: Vec<SlideRecord>,
}

impl Deck {
    /// Create a new empty deck
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck from records
    pub fn from_slides(slides: Vec<SlideRecord>) -> Self {
        Self { slides }
    }

    /// Add a slide to the deck
    pub fn push(&mut self, slide: SlideRecord) {
        self.slides.push(slide);
    }

    /// Get the number of slides
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if the deck is empty
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Iterate over the slides in order
    pub fn iter(&self) -> std::slice::Iter<'_, SlideRecord> {
        self.slides.iter()
    }

    /// Title of the presentation (the first slide's title)
    pub fn title(&self) -> Option<&str> {
        self.slides.first().map(|s| s.title.as_str())
    }

    /// Drop slides beyond the caller's slide-count entitlement.
    ///
    /// Returns the number of slides removed.
    pub fn truncate_to(&mut self, max_slides: usize) -> usize {
        let removed = self.slides.len().saturating_sub(max_slides);
        self.slides.truncate(max_slides);
        removed
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a SlideRecord;
    type IntoIter = std::slice::Iter<'a, SlideRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}
