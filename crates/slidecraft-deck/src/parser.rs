//! Content parser: generated text to a normalized [`Deck`].
//!
//! Language models hand back either a JSON array of slide objects or loosely
//! structured prose. The input is classified once into a [`ContentInput`]
//! and then normalized:
//!
//! - **Structured**: `[{"title": ..., "bullets": [...]}, ...]` maps one
//!   element to one slide
//! - **Prose**: blank lines separate slides, the first line of a block is
//!   the title, the remaining lines are bullets
//!
//! Title prefixes such as `Slide 2:` are stripped by a configurable set of
//! patterns (see [`ParserConfig`]).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::slide::{Deck, SlideRecord};

/// Title prefix patterns applied when no configuration overrides them.
///
/// Every pattern, default or configured, is anchored at the start of the
/// title and removed together with the whitespace that follows it.
pub const DEFAULT_PREFIX_PATTERNS: &[&str] = &[
    r"(?i)^first\s+slide\s*:\s*",
    r"(?i)^slide\s+\d+\s*[:.\-–]\s*",
    r"(?i)^slide\s+\d+$",
    r"^\d+[.:)]+(\s+|$)",
    r"(?i)^title\s*:\s*",
    r"^#{1,6}\s+",
    r"^\[\d+\]\s*",
];

/// Leading glyphs stripped from bullet lines
const BULLET_GLYPHS: &[char] = &[
    '•', '-', '*', '+', '–', '—', '▪', '◦', '●', '·', '‣', '○', '■',
];

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Regex patterns stripped from the start of every title
    pub prefix_patterns: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefix_patterns: DEFAULT_PREFIX_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Generated content, classified at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentInput {
    /// Pre-structured slide records (from a JSON array)
    Structured(Vec<SlideRecord>),

    /// Semi-structured prose
    Prose(String),
}

/// JSON slide object as emitted by generators
#[derive(Debug, Deserialize)]
struct RawSlide {
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default, alias = "points")]
    bullets: Vec<String>,
}

impl ContentInput {
    /// Classify a block of generated text.
    ///
    /// The text is structured when it is a JSON array of slide objects,
    /// optionally wrapped in a markdown code fence.
    pub fn detect(text: &str) -> Self {
        let candidate = strip_code_fence(text.trim());

        if candidate.starts_with('[') {
            if let Ok(raw) = serde_json::from_str::<Vec<RawSlide>>(candidate) {
                log::debug!("Detected structured content with {} slides", raw.len());
                return Self::Structured(raw.into_iter().map(RawSlide::into_record).collect());
            }
        }

        Self::Prose(text.to_string())
    }
}

impl RawSlide {
    fn into_record(self) -> SlideRecord {
        SlideRecord {
            title: self.title.trim().to_string(),
            subtitle: self
                .subtitle
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            bullets: self
                .bullets
                .iter()
                .map(|b| b.trim())
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Strip a surrounding ```` ``` ```` fence (with optional language tag)
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line
    match body.find('\n') {
        Some(pos) => body[pos + 1..].trim(),
        None => body.trim(),
    }
}

/// Converts generated text into a [`Deck`]
#[derive(Debug, Clone)]
pub struct ContentParser {
    prefix_rules: Vec<Regex>,
}

impl Default for ContentParser {
    fn default() -> Self {
        Self {
            prefix_rules: DEFAULT_PREFIX_PATTERNS
                .iter()
                .filter_map(|p| anchored(p).ok())
                .collect(),
        }
    }
}

impl ContentParser {
    /// Create a parser with the default prefix rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from configuration
    pub fn with_config(config: &ParserConfig) -> Result<Self, ParseError> {
        let prefix_rules = config
            .prefix_patterns
            .iter()
            .map(|pattern| {
                anchored(pattern).map_err(|source| ParseError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { prefix_rules })
    }

    /// Parse generated text into a deck
    pub fn parse(&self, text: &str) -> Result<Deck, ParseError> {
        self.parse_input(ContentInput::detect(text))
    }

    /// Normalize already-classified input into a deck
    pub fn parse_input(&self, input: ContentInput) -> Result<Deck, ParseError> {
        let deck = match input {
            ContentInput::Structured(records) => Deck::from_slides(
                records
                    .into_iter()
                    .filter(|r| !r.title.is_empty())
                    .collect(),
            ),
            ContentInput::Prose(text) => self.parse_prose(&text),
        };

        if deck.is_empty() {
            return Err(ParseError::EmptyContent);
        }

        Ok(deck)
    }

    /// Segment prose into blocks and build one record per block
    fn parse_prose(&self, text: &str) -> Deck {
        let blocks = split_blocks(text);
        let mut deck = Deck::new();

        for block in &blocks {
            match self.parse_block(block, deck.is_empty()) {
                Some(record) => deck.push(record),
                None => log::debug!("Dropped block without a title: {:?}", block.first()),
            }
        }

        log::debug!(
            "Parsed {} slides from {} prose blocks",
            deck.len(),
            blocks.len()
        );
        deck
    }

    /// Build a record from one block of non-empty lines
    fn parse_block(&self, lines: &[&str], is_first: bool) -> Option<SlideRecord> {
        let mut lines = lines.iter();

        // Marker-only lines ("First Slide:") yield to the next line
        let title = lines.by_ref().find_map(|line| {
            let title = self.normalize_title(line);
            (!title.is_empty()).then_some(title)
        })?;

        let mut bullets: Vec<String> = lines
            .map(|line| strip_bullet(line))
            .filter(|b| !b.is_empty())
            .collect();

        let subtitle = if is_first && bullets.len() == 1 {
            bullets.pop()
        } else {
            None
        };

        Some(SlideRecord {
            title,
            subtitle,
            bullets,
        })
    }

    /// Strip slide-ordinal markers, bullet glyphs and bracket artifacts from
    /// a title.
    ///
    /// Rules are applied until the title stops changing, so normalizing an
    /// already-normalized title returns it unchanged.
    pub fn normalize_title(&self, raw: &str) -> String {
        let mut title = raw.trim().to_string();

        loop {
            let before = title.len();

            title = strip_bullet(&title);

            for rule in &self.prefix_rules {
                if let Some(m) = rule.find(&title) {
                    title = title[m.end()..].trim().to_string();
                }
            }

            title = title.replace("**", "").trim().to_string();

            if let Some(inner) = unwrap_brackets(&title) {
                title = inner.trim().to_string();
            }

            if title.len() == before {
                return title;
            }
        }
    }
}

/// Compile a prefix rule so it can only match at the start of the title
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

/// Inner text of a title wrapped entirely in one pair of brackets
fn unwrap_brackets(title: &str) -> Option<&str> {
    let inner = title.strip_prefix('[')?.strip_suffix(']')?;
    (!inner.contains(['[', ']'])).then_some(inner)
}

/// Split text into blocks of non-empty lines separated by blank lines
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Strip leading bullet glyphs and surrounding whitespace.
///
/// ASCII glyphs (`-`, `*`, `+`) count only when followed by whitespace so
/// that `**Bold**` or `-5%` survive.
fn strip_bullet(line: &str) -> String {
    let mut rest = line.trim();

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if BULLET_GLYPHS.contains(&c) => {
                let after = chars.as_str();
                if c.is_ascii() && !(after.is_empty() || after.starts_with(char::is_whitespace)) {
                    break;
                }
                rest = after.trim_start();
            }
            _ => break,
        }
    }

    rest.trim().to_string()
}

/// Parse generated text with the default parser
pub fn parse(text: &str) -> Result<Deck, ParseError> {
    ContentParser::default().parse(text)
}
