//! Slide geometry and font fitting.
//!
//! Every deck uses the same 16:9 canvas. This module computes the shape
//! rectangles for the two slide layouts and shrinks bullet text until it
//! fits above the bottom margin.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// The two layouts a deck uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Title slide (centered title and subtitle)
    Title,

    /// Title and content (bullets, optional image on the right)
    Content,
}

impl LayoutKind {
    /// Layout for the slide at `index` in the deck
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Self::Title
        } else {
            Self::Content
        }
    }

    /// The OOXML `type` attribute of the slide layout part
    pub fn ooxml_type(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "obj",
        }
    }

    /// Display name of the slide layout part
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "Title Slide",
            Self::Content => "Title and Content",
        }
    }

    /// 1-based index matching `slideLayoutN.xml`
    pub fn layout_index(self) -> u32 {
        match self {
            Self::Title => 1,
            Self::Content => 2,
        }
    }
}

/// A shape rectangle in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Bottom edge in EMU
    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }

    /// Right edge in EMU
    pub fn right(&self) -> i64 {
        self.x + self.cx
    }
}

/// Convert inches to EMU
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Font sizes in points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    /// Title on the title slide
    pub title_slide_title: u32,

    /// Subtitle on the title slide
    pub subtitle: u32,

    /// Title on content slides
    pub content_title: u32,

    /// Starting bullet size
    pub bullet_base: u32,

    /// Bullet size floor for font fitting
    pub bullet_min: u32,

    /// Decrement per fitting step
    pub bullet_step: u32,

    /// Space before each bullet after the first
    pub bullet_spacing: u32,

    /// Watermark label
    pub watermark: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title_slide_title: 44,
            subtitle: 32,
            content_title: 40,
            bullet_base: 24,
            bullet_min: 12,
            bullet_step: 2,
            bullet_spacing: 12,
            watermark: 10,
        }
    }
}

/// Largest run size OOXML accepts, in points
pub const MAX_FONT_SIZE: u32 = 4000;

/// Largest paragraph spacing OOXML accepts, in points
pub const MAX_SPACING: u32 = 1584;

impl FontSizes {
    /// Bring every size into the range a presentation can hold
    pub fn clamped(&self) -> Self {
        let size = |pt: u32| pt.clamp(1, MAX_FONT_SIZE);
        Self {
            title_slide_title: size(self.title_slide_title),
            subtitle: size(self.subtitle),
            content_title: size(self.content_title),
            bullet_base: size(self.bullet_base),
            bullet_min: size(self.bullet_min),
            bullet_step: size(self.bullet_step),
            bullet_spacing: self.bullet_spacing.min(MAX_SPACING),
            watermark: size(self.watermark),
        }
    }
}

/// Shape rectangles for a fixed canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideGeometry {
    /// Canvas width in EMU
    pub width: i64,

    /// Canvas height in EMU
    pub height: i64,
}

impl Default for SlideGeometry {
    fn default() -> Self {
        Self::widescreen()
    }
}

impl SlideGeometry {
    /// The 16:9 canvas (13.333" x 7.5")
    pub const fn widescreen() -> Self {
        Self {
            width: WIDESCREEN_SLIDE_WIDTH_EMU,
            height: WIDESCREEN_SLIDE_HEIGHT_EMU,
        }
    }

    /// Lowest y any text may reach (0.5" above the bottom edge)
    pub fn printable_bottom(&self) -> i64 {
        self.height - inches(0.5)
    }

    /// Whole canvas, for full-bleed images
    pub fn full_bleed(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn title_slide_title(&self) -> Rect {
        Rect::new(inches(0.5), inches(1.0), self.width - inches(1.0), inches(2.0))
    }

    /// Subtitle box, 2.5" below the top of the title box
    pub fn title_slide_subtitle(&self) -> Rect {
        let title = self.title_slide_title();
        Rect::new(title.x, title.y + inches(2.5), title.cx, inches(1.5))
    }

    pub fn content_title(&self) -> Rect {
        Rect::new(inches(0.5), inches(0.5), self.width - inches(1.0), inches(1.2))
    }

    /// Bullet box; narrower when an image sits to its right
    pub fn content_body(&self, with_image: bool) -> Rect {
        let title = self.content_title();
        let top = title.bottom() + inches(0.2);
        let mut width = title.cx - inches(0.5);
        if with_image {
            width -= inches(4.5);
        }
        Rect::new(title.x + inches(0.5), top, width, self.printable_bottom() - top)
    }

    /// Image box to the right of the bullets
    pub fn content_image(&self) -> Rect {
        let top = self.content_body(true).y;
        let (cx, cy) = (inches(4.5), inches(4.0));
        Rect::new(self.width - cx - inches(0.5), top, cx, cy)
    }

    /// Bottom-right watermark label
    pub fn watermark(&self) -> Rect {
        let (cx, cy) = (inches(3.5), inches(0.4));
        Rect::new(
            self.width - cx - inches(0.2),
            self.height - cy - inches(0.2),
            cx,
            cy,
        )
    }
}

/// Result of fitting bullet text into its box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFit {
    /// Chosen bullet size in points
    pub size: u32,

    /// Estimated bottom edge of the text at that size, in EMU
    pub bottom: i64,

    /// Text still overflows the printable area at the floor size
    pub overflow: bool,
}

/// Average glyph advance as a fraction of the font size
const AVG_GLYPH_WIDTH_EM: f64 = 0.5;

/// Line height as a fraction of the font size
const LINE_HEIGHT_EM: f64 = 1.2;

/// Default text box inset on each side (0.1")
const TEXT_INSET_PT: f64 = 7.2;

/// Estimate the rendered height of a bullet list in EMU
pub fn estimate_text_height(bullets: &[String], box_width: i64, size: u32, spacing: u32) -> i64 {
    if bullets.is_empty() {
        return 0;
    }

    let size = f64::from(size.max(1));
    let usable_pt = (box_width as f64 / EMU_PER_POINT as f64 - 2.0 * TEXT_INSET_PT).max(size);
    let chars_per_line = (usable_pt / (size * AVG_GLYPH_WIDTH_EM)).floor().max(1.0);

    let lines: f64 = bullets
        .iter()
        .map(|b| (b.chars().count() as f64 / chars_per_line).ceil().max(1.0))
        .sum();

    let spacing_pt = f64::from(spacing) * (bullets.len() - 1) as f64;
    let height_pt = lines * size * LINE_HEIGHT_EM + spacing_pt + 2.0 * TEXT_INSET_PT;

    (height_pt * EMU_PER_POINT as f64).ceil() as i64
}

/// Pick the largest bullet size whose text stays above `printable_bottom`.
///
/// Starts at `fonts.bullet_base` and steps down by `fonts.bullet_step`,
/// never going below `fonts.bullet_min`. At the floor it stops whether or
/// not the text fits.
pub fn fit_bullet_font(
    bullets: &[String],
    body: Rect,
    printable_bottom: i64,
    fonts: &FontSizes,
) -> FontFit {
    let floor = fonts.bullet_min.max(1);
    let step = fonts.bullet_step.max(1);
    let mut size = fonts.bullet_base.max(floor);

    loop {
        let bottom = body.y + estimate_text_height(bullets, body.cx, size, fonts.bullet_spacing);
        let overflow = bottom > printable_bottom;

        if !overflow || size == floor {
            return FontFit {
                size,
                bottom,
                overflow,
            };
        }

        size = size.saturating_sub(step).max(floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullets(n: usize, len: usize) -> Vec<String> {
        (0..n).map(|_| "x".repeat(len)).collect()
    }

    #[test]
    fn test_layout_kind() {
        assert_eq!(LayoutKind::for_index(0), LayoutKind::Title);
        assert_eq!(LayoutKind::for_index(1), LayoutKind::Content);
        assert_eq!(LayoutKind::for_index(29), LayoutKind::Content);
        assert_eq!(LayoutKind::Title.layout_index(), 1);
        assert_eq!(LayoutKind::Content.ooxml_type(), "obj");
    }

    #[test]
    fn test_widescreen_geometry() {
        let geo = SlideGeometry::widescreen();
        let ratio = geo.width as f64 / geo.height as f64;
        assert!((ratio - 16.0 / 9.0).abs() < 0.01);

        assert_eq!(geo.full_bleed(), Rect::new(0, 0, geo.width, geo.height));
        assert_eq!(geo.printable_bottom(), geo.height - inches(0.5));
    }

    #[test]
    fn test_shapes_stay_on_canvas() {
        let geo = SlideGeometry::widescreen();
        let rects = [
            geo.title_slide_title(),
            geo.title_slide_subtitle(),
            geo.content_title(),
            geo.content_body(false),
            geo.content_body(true),
            geo.content_image(),
            geo.watermark(),
        ];

        for rect in rects {
            assert!(rect.x >= 0 && rect.y >= 0, "{rect:?}");
            assert!(rect.right() <= geo.width, "{rect:?}");
            assert!(rect.bottom() <= geo.height, "{rect:?}");
        }
    }

    #[test]
    fn test_image_does_not_overlap_body() {
        let geo = SlideGeometry::widescreen();
        assert!(geo.content_body(true).right() <= geo.content_image().x);
        assert!(geo.content_body(false).cx > geo.content_body(true).cx);
    }

    #[test]
    fn test_subtitle_below_title() {
        let geo = SlideGeometry::widescreen();
        let title = geo.title_slide_title();
        let subtitle = geo.title_slide_subtitle();

        assert_eq!(subtitle.y - title.y, inches(2.5));
        assert!(subtitle.y >= title.bottom());
    }

    #[test]
    fn test_estimate_grows_with_content() {
        let width = inches(7.0);
        let short = estimate_text_height(&bullets(2, 10), width, 24, 12);
        let long = estimate_text_height(&bullets(2, 200), width, 24, 12);
        let more = estimate_text_height(&bullets(6, 10), width, 24, 12);

        assert!(long > short);
        assert!(more > short);
        assert_eq!(estimate_text_height(&[], width, 24, 12), 0);
    }

    #[test]
    fn test_short_content_keeps_base_size() {
        let geo = SlideGeometry::widescreen();
        let fonts = FontSizes::default();
        let fit = fit_bullet_font(
            &bullets(3, 40),
            geo.content_body(false),
            geo.printable_bottom(),
            &fonts,
        );

        assert_eq!(fit.size, fonts.bullet_base);
        assert!(!fit.overflow);
    }

    #[test]
    fn test_long_content_shrinks() {
        let geo = SlideGeometry::widescreen();
        let fonts = FontSizes::default();
        let fit = fit_bullet_font(
            &bullets(8, 120),
            geo.content_body(true),
            geo.printable_bottom(),
            &fonts,
        );

        assert!(fit.size < fonts.bullet_base);
        assert!(fit.size >= fonts.bullet_min);
    }

    #[test]
    fn test_font_never_below_floor() {
        let geo = SlideGeometry::widescreen();
        let fonts = FontSizes::default();

        for (count, len) in [(1, 10), (10, 200), (30, 500), (100, 1000)] {
            let fit = fit_bullet_font(
                &bullets(count, len),
                geo.content_body(true),
                geo.printable_bottom(),
                &fonts,
            );
            assert!(fit.size >= fonts.bullet_min, "{count}x{len}: {fit:?}");
        }

        // Overflow remains at the floor; no further mitigation
        let fit = fit_bullet_font(
            &bullets(100, 1000),
            geo.content_body(true),
            geo.printable_bottom(),
            &fonts,
        );
        assert_eq!(fit.size, fonts.bullet_min);
        assert!(fit.overflow);
    }

    #[test]
    fn test_odd_step_lands_on_floor() {
        let geo = SlideGeometry::widescreen();
        let fonts = FontSizes {
            bullet_base: 25,
            bullet_min: 12,
            bullet_step: 4,
            ..Default::default()
        };
        let fit = fit_bullet_font(
            &bullets(60, 400),
            geo.content_body(true),
            geo.printable_bottom(),
            &fonts,
        );

        assert_eq!(fit.size, 12);
    }

    #[test]
    fn test_base_below_floor_is_clamped() {
        let geo = SlideGeometry::widescreen();
        let fonts = FontSizes {
            bullet_base: 8,
            bullet_min: 12,
            ..Default::default()
        };
        let fit = fit_bullet_font(&bullets(1, 5), geo.content_body(false), geo.printable_bottom(), &fonts);

        assert_eq!(fit.size, 12);
    }
}
