//! PPTX generation from a parsed deck.
//!
//! [`DeckRenderer`] writes one complete presentation package per call: the
//! package plumbing (content types, relationships, properties), a theme, one
//! slide master with the two layouts, and one slide part per record.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::constants::*;
use crate::error::{RenderError, Result};
use crate::image::{obtain_image, EmbeddedImage, ImagePrompt, ImageSource, SlideImage};
use crate::layout::{fit_bullet_font, FontSizes, LayoutKind, Rect, SlideGeometry};
use crate::slide::{Deck, SlideRecord};
use crate::style::{Background, Rgb, StyleConfig};

/// Watermark label used when none is configured
pub const DEFAULT_WATERMARK_TEXT: &str = "Created with Slidecraft";

/// Default author written to the document properties
pub const DEFAULT_AUTHOR: &str = "Slidecraft";

/// Default language tag for text runs
pub const DEFAULT_LOCALE: &str = "en-US";

/// Watermark text colour
const WATERMARK_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// Watermark opacity in thousandths of a percent (60 %)
const WATERMARK_ALPHA: u32 = 60_000;

/// Fixed creation timestamp, so identical input gives identical bytes
const DOCUMENT_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// Finished presentation package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDeck {
    bytes: Vec<u8>,
    slide_count: usize,
}

impl RenderedDeck {
    /// Package bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the package bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of slides in the package
    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// File name derived from the package content: `presentation_<hash>.pptx`
    pub fn suggested_file_name(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        let hash: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
        format!("presentation_{hash}.pptx")
    }

    /// Write the package to disk
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Text alignment within a text box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn as_ooxml(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }
}

/// Run properties for one paragraph
#[derive(Debug, Clone, Copy)]
struct RunStyle {
    size: u32,
    bold: bool,
    color: Rgb,
    alpha: Option<u32>,
}

/// Hands out shape ids within one slide (1 is the group shape)
struct ShapeIds(u32);

impl ShapeIds {
    fn new() -> Self {
        Self(1)
    }

    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

/// A slide and the image obtained for it
struct PlannedSlide<'a> {
    record: &'a SlideRecord,
    layout: LayoutKind,
    image: SlideImage,
    /// `imageN.ext` under `ppt/media/`
    media_name: Option<String>,
}

/// PPTX deck renderer
pub struct DeckRenderer {
    /// Canvas and shape rectangles
    geometry: SlideGeometry,

    /// Font sizes and fitting parameters
    fonts: FontSizes,

    /// Language tag for text runs
    locale: String,

    /// Presentation author
    author: String,

    /// Watermark label
    watermark_text: String,

    /// Image collaborator (if any)
    image_source: Option<Box<dyn ImageSource>>,
}

impl Default for DeckRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeckRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckRenderer")
            .field("geometry", &self.geometry)
            .field("fonts", &self.fonts)
            .field("locale", &self.locale)
            .field("author", &self.author)
            .field("watermark_text", &self.watermark_text)
            .field("image_source", &self.image_source.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl DeckRenderer {
    /// Create a renderer with default fonts and no image source
    pub fn new() -> Self {
        Self {
            geometry: SlideGeometry::widescreen(),
            fonts: FontSizes::default(),
            locale: DEFAULT_LOCALE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            image_source: None,
        }
    }

    /// Set the font sizes, clamped to what a presentation can hold
    pub fn with_fonts(mut self, fonts: FontSizes) -> Self {
        self.fonts = fonts.clamped();
        self
    }

    /// Set the language tag
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the watermark label
    pub fn with_watermark_text(mut self, text: impl Into<String>) -> Self {
        self.watermark_text = text.into();
        self
    }

    /// Set the image collaborator
    pub fn with_image_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.image_source = Some(Box::new(source));
        self
    }

    /// Set or clear an already boxed image collaborator
    pub fn with_boxed_image_source(mut self, source: Option<Box<dyn ImageSource>>) -> Self {
        self.image_source = source;
        self
    }

    /// Check whether an image collaborator is configured
    pub fn has_image_source(&self) -> bool {
        self.image_source.is_some()
    }

    /// Get the font sizes
    pub fn fonts(&self) -> &FontSizes {
        &self.fonts
    }

    /// Render the deck into a PPTX package
    pub fn render(
        &self,
        deck: &Deck,
        style: &StyleConfig,
        watermark_requested: bool,
    ) -> Result<RenderedDeck> {
        if deck.is_empty() {
            return Err(RenderError::EmptyDeck);
        }

        log::debug!(
            "Rendering {} slides (watermark: {}, images: {})",
            deck.len(),
            watermark_requested,
            self.has_image_source()
        );

        let slides = self.plan_slides(deck);

        let buffer = Vec::new();
        let cursor = Cursor::new(buffer);
        let mut zip = ZipWriter::new(cursor);

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        self.write_content_types(&mut zip, options, slides.len())?;
        self.write_root_rels(&mut zip, options)?;
        self.write_app_xml(&mut zip, options, deck)?;
        self.write_core_xml(&mut zip, options, deck)?;
        self.write_presentation_xml(&mut zip, options, slides.len())?;
        self.write_presentation_rels(&mut zip, options, slides.len())?;
        self.write_pres_props(&mut zip, options)?;
        self.write_table_styles(&mut zip, options)?;
        self.write_view_props(&mut zip, options)?;
        self.write_theme(&mut zip, options, style)?;
        self.write_slide_master(&mut zip, options)?;
        self.write_slide_layouts(&mut zip, options)?;

        for (i, slide) in slides.iter().enumerate() {
            self.write_slide(&mut zip, options, i + 1, slide, style, watermark_requested)?;
        }

        for slide in &slides {
            if let (SlideImage::Image(image), Some(name)) = (&slide.image, &slide.media_name) {
                zip.start_file(format!("ppt/media/{name}"), options)?;
                zip.write_all(&image.data)?;
            }
        }

        let cursor = zip.finish()?;
        Ok(RenderedDeck {
            bytes: cursor.into_inner(),
            slide_count: slides.len(),
        })
    }

    /// Pick layouts and fetch images, one slide at a time
    fn plan_slides<'a>(&self, deck: &'a Deck) -> Vec<PlannedSlide<'a>> {
        let source = self.image_source.as_deref();
        let mut media_count = 0;

        deck.iter()
            .enumerate()
            .map(|(index, record)| {
                let layout = LayoutKind::for_index(index);
                let image = match (source, layout) {
                    (None, _) => SlideImage::NoImage,
                    (Some(_), LayoutKind::Title) => {
                        obtain_image(source, &ImagePrompt::for_title_slide(record))
                    }
                    (Some(_), LayoutKind::Content) => {
                        obtain_image(source, &ImagePrompt::for_content_slide(record))
                    }
                };

                let media_name = match &image {
                    SlideImage::Image(EmbeddedImage { format, .. }) => {
                        media_count += 1;
                        Some(format!("image{}.{}", media_count, format.extension()))
                    }
                    SlideImage::NoImage => None,
                };

                PlannedSlide {
                    record,
                    layout,
                    image,
                    media_name,
                }
            })
            .collect()
    }

    /// Write [Content_Types].xml
    fn write_content_types<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_count: usize,
    ) -> Result<()> {
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpeg" ContentType="image/jpeg"/>
  <Default Extension="gif" ContentType="image/gif"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>
  <Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>
  <Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );

        for i in 1..=slide_count {
            content.push_str(&format!(
                "  <Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n",
                i
            ));
        }

        content.push_str("</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write _rels/.rels
    fn write_root_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("_rels/.rels", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="ppt/presentation.xml"/>
  <Relationship Id="rId2" Type="{}" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="{}" Target="docProps/app.xml"/>
</Relationships>"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_CORE_PROPERTIES, REL_TYPE_EXTENDED_PROPERTIES
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/app.xml
    fn write_app_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        deck: &Deck,
    ) -> Result<()> {
        zip.start_file("docProps/app.xml", options)?;

        let words: usize = deck
            .iter()
            .map(|s| s.as_plain_text().split_whitespace().count())
            .sum();
        let paragraphs: usize = deck
            .iter()
            .map(|s| 1 + usize::from(s.subtitle.is_some()) + s.bullets.len())
            .sum();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Words>{}</Words>
  <Application>Slidecraft</Application>
  <PresentationFormat>Widescreen</PresentationFormat>
  <Paragraphs>{}</Paragraphs>
  <Slides>{}</Slides>
  <Notes>0</Notes>
  <HiddenSlides>0</HiddenSlides>
  <MMClips>0</MMClips>
  <ScaleCrop>false</ScaleCrop>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
  <AppVersion>{}</AppVersion>
</Properties>"#,
            words,
            paragraphs,
            deck.len(),
            env!("CARGO_PKG_VERSION")
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/core.xml
    fn write_core_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        deck: &Deck,
    ) -> Result<()> {
        zip.start_file("docProps/core.xml", options)?;

        let title = deck.title().unwrap_or("Presentation");

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>{}</dc:creator>
  <cp:lastModifiedBy>{}</cp:lastModifiedBy>
  <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
</cp:coreProperties>"#,
            xml_text(title),
            xml_text(&self.author),
            xml_text(&self.author),
            DOCUMENT_TIMESTAMP,
            DOCUMENT_TIMESTAMP
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/presentation.xml
    fn write_presentation_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_count: usize,
    ) -> Result<()> {
        zip.start_file("ppt/presentation.xml", options)?;

        let mut slide_refs = String::new();
        for i in 1..=slide_count {
            slide_refs.push_str(&format!(
                "    <p:sldId id=\"{}\" r:id=\"rId{}\"/>\n",
                255 + i,
                i + 3 // rId1=slideMaster, rId2=presProps, rId3=theme, rId4+=slides
            ));
        }

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldIdLst>
{}  </p:sldIdLst>
  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            slide_refs,
            self.geometry.width,
            self.geometry.height,
            self.geometry.height, // Notes are portrait
            self.geometry.width
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/_rels/presentation.xml.rels
    fn write_presentation_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_count: usize,
    ) -> Result<()> {
        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;

        let mut rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="{}" Target="presProps.xml"/>
  <Relationship Id="rId3" Type="{}" Target="theme/theme1.xml"/>
"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_MASTER, REL_TYPE_PRES_PROPS, REL_TYPE_THEME
        );

        for i in 1..=slide_count {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"slides/slide{}.xml\"/>\n",
                i + 3,
                REL_TYPE_SLIDE,
                i
            ));
        }

        rels.push_str("</Relationships>");

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Write ppt/presProps.xml
    fn write_pres_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/presProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/tableStyles.xml
    fn write_table_styles<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/tableStyles.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
            NS_DRAWING
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/viewProps.xml
    fn write_view_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/viewProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
  <p:slideViewPr>
    <p:cSldViewPr>
      <p:cViewPr varScale="1">
        <p:scale>
          <a:sx n="100" d="100"/>
          <a:sy n="100" d="100"/>
        </p:scale>
        <p:origin x="0" y="0"/>
      </p:cViewPr>
    </p:cSldViewPr>
  </p:slideViewPr>
</p:viewPr>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/theme/theme1.xml, with the deck colours in the scheme
    fn write_theme<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        style: &StyleConfig,
    ) -> Result<()> {
        zip.start_file("ppt/theme/theme1.xml", options)?;

        let (background, _) = style.background.colors();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="{}" name="Slidecraft">
  <a:themeElements>
    <a:clrScheme name="Slidecraft">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="{}"/></a:dk2>
      <a:lt2><a:srgbClr val="{}"/></a:lt2>
      <a:accent1><a:srgbClr val="{}"/></a:accent1>
      <a:accent2><a:srgbClr val="{}"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont>
        <a:latin typeface="Calibri Light"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="Calibri"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
            NS_DRAWING,
            style.title_color.to_hex(),
            background.to_hex(),
            style.title_color.to_hex(),
            style.text_color.to_hex(),
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/slideMasters/slideMaster1.xml
    fn write_slide_master<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001">
        <a:schemeClr val="bg1"/>
      </p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="2147483649" r:id="rId1"/>
    <p:sldLayoutId id="2147483650" r:id="rId2"/>
  </p:sldLayoutIdLst>
</p:sldMaster>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;

        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;

        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="{}" Target="../slideLayouts/slideLayout2.xml"/>
  <Relationship Id="rId3" Type="{}" Target="../theme/theme1.xml"/>
</Relationships>"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_LAYOUT, REL_TYPE_SLIDE_LAYOUT, REL_TYPE_THEME
        );

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Write both slide layouts and their rels
    fn write_slide_layouts<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_MASTER
        );

        for kind in [LayoutKind::Title, LayoutKind::Content] {
            let index = kind.layout_index();

            zip.start_file(format!("ppt/slideLayouts/slideLayout{index}.xml"), options)?;
            zip.write_all(self.layout_xml(kind).as_bytes())?;

            zip.start_file(
                format!("ppt/slideLayouts/_rels/slideLayout{index}.xml.rels"),
                options,
            )?;
            zip.write_all(rels.as_bytes())?;
        }

        Ok(())
    }

    /// Layout part with placeholders at the same rectangles the slides use
    fn layout_xml(&self, kind: LayoutKind) -> String {
        let (title_ph, title_rect, body_ph, body_name, body_rect) = match kind {
            LayoutKind::Title => (
                "ctrTitle",
                self.geometry.title_slide_title(),
                r#"type="subTitle" idx="1""#,
                "Subtitle 2",
                self.geometry.title_slide_subtitle(),
            ),
            LayoutKind::Content => (
                "title",
                self.geometry.content_title(),
                r#"idx="1""#,
                "Content Placeholder 2",
                self.geometry.content_body(false),
            ),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">
  <p:cSld name="{}">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Title 1"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="{}"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr>
          {}
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p><a:endParaRPr lang="{}"/></a:p>
        </p:txBody>
      </p:sp>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="{}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph {}/></p:nvPr>
        </p:nvSpPr>
        <p:spPr>
          {}
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p><a:endParaRPr lang="{}"/></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            kind.ooxml_type(),
            kind.name(),
            title_ph,
            xfrm(title_rect),
            xml_text(&self.locale),
            body_name,
            body_ph,
            xfrm(body_rect),
            xml_text(&self.locale),
        )
    }

    /// Write a single slide and its rels
    fn write_slide<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_num: usize,
        slide: &PlannedSlide<'_>,
        style: &StyleConfig,
        watermark: bool,
    ) -> Result<()> {
        let content = self.slide_xml(slide_num, slide, style, watermark);
        ensure_well_formed(&content)?;

        zip.start_file(format!("ppt/slides/slide{}.xml", slide_num), options)?;
        zip.write_all(content.as_bytes())?;

        zip.start_file(
            format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            options,
        )?;

        let mut rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout{}.xml"/>
"#,
            NS_PACKAGE_RELATIONSHIPS,
            REL_TYPE_SLIDE_LAYOUT,
            slide.layout.layout_index()
        );

        if let Some(name) = &slide.media_name {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId2\" Type=\"{}\" Target=\"../media/{}\"/>\n",
                REL_TYPE_IMAGE, name
            ));
        }

        rels.push_str("</Relationships>");

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Generate slide XML content
    fn slide_xml(
        &self,
        slide_num: usize,
        slide: &PlannedSlide<'_>,
        style: &StyleConfig,
        watermark: bool,
    ) -> String {
        let mut ids = ShapeIds::new();
        let has_image = slide.image.is_image();

        let mut shapes = match slide.layout {
            LayoutKind::Title => self.title_slide_shapes(&mut ids, slide.record, style, has_image),
            LayoutKind::Content => {
                self.content_slide_shapes(&mut ids, slide_num, slide.record, style, has_image)
            }
        };

        if watermark {
            shapes.push_str(&self.watermark_shape(&mut ids));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgPr>
        {}
        <a:effectLst/>
      </p:bgPr>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            background_fill(&style.background),
            shapes
        )
    }

    /// Full-bleed image (behind), centred title and subtitle
    fn title_slide_shapes(
        &self,
        ids: &mut ShapeIds,
        record: &SlideRecord,
        style: &StyleConfig,
        has_image: bool,
    ) -> String {
        let mut shapes = String::new();

        if has_image {
            shapes.push_str(&picture_shape(ids.next(), self.geometry.full_bleed()));
        }

        let title_style = RunStyle {
            size: self.fonts.title_slide_title,
            bold: true,
            color: style.title_color,
            alpha: None,
        };
        let title = self.paragraph(&record.title, Align::Center, title_style, None, false);
        shapes.push_str(&text_box(
            ids.next(),
            "Title",
            self.geometry.title_slide_title(),
            "ctr",
            &title,
        ));

        // Extra lines of the opening block stay on the title slide
        let lines: Vec<&str> = record
            .subtitle
            .iter()
            .chain(record.bullets.iter())
            .map(String::as_str)
            .collect();

        if !lines.is_empty() {
            let subtitle_style = RunStyle {
                size: self.fonts.subtitle,
                bold: false,
                color: style.text_color,
                alpha: None,
            };
            let paragraphs: String = lines
                .iter()
                .map(|line| self.paragraph(line, Align::Center, subtitle_style, None, false))
                .collect();

            shapes.push_str(&text_box(
                ids.next(),
                "Subtitle",
                self.geometry.title_slide_subtitle(),
                "t",
                &paragraphs,
            ));
        }

        shapes
    }

    /// Left-aligned title, fitted bullets, image on the right
    fn content_slide_shapes(
        &self,
        ids: &mut ShapeIds,
        slide_num: usize,
        record: &SlideRecord,
        style: &StyleConfig,
        has_image: bool,
    ) -> String {
        let mut shapes = String::new();

        let title_style = RunStyle {
            size: self.fonts.content_title,
            bold: true,
            color: style.title_color,
            alpha: None,
        };
        let title = self.paragraph(&record.title, Align::Left, title_style, None, false);
        shapes.push_str(&text_box(
            ids.next(),
            "Title",
            self.geometry.content_title(),
            "ctr",
            &title,
        ));

        if !record.bullets.is_empty() {
            let body = self.geometry.content_body(has_image);
            let fit = fit_bullet_font(
                &record.bullets,
                body,
                self.geometry.printable_bottom(),
                &self.fonts,
            );

            if fit.size < self.fonts.bullet_base {
                log::debug!("Slide {}: bullets shrunk to {}pt", slide_num, fit.size);
            }
            if fit.overflow {
                log::warn!(
                    "Slide {}: text still overflows at the {}pt floor",
                    slide_num,
                    fit.size
                );
            }

            let bullet_style = RunStyle {
                size: fit.size,
                bold: false,
                color: style.text_color,
                alpha: None,
            };
            let paragraphs: String = record
                .bullets
                .iter()
                .enumerate()
                .map(|(i, bullet)| {
                    let spacing = (i > 0).then_some(self.fonts.bullet_spacing);
                    self.paragraph(bullet, Align::Left, bullet_style, spacing, true)
                })
                .collect();

            shapes.push_str(&text_box(ids.next(), "Content", body, "t", &paragraphs));
        }

        if has_image {
            shapes.push_str(&picture_shape(ids.next(), self.geometry.content_image()));
        }

        shapes
    }

    /// Bottom-right watermark label
    fn watermark_shape(&self, ids: &mut ShapeIds) -> String {
        let run = RunStyle {
            size: self.fonts.watermark,
            bold: false,
            color: WATERMARK_COLOR,
            alpha: Some(WATERMARK_ALPHA),
        };
        let paragraph = self.paragraph(&self.watermark_text, Align::Right, run, None, false);

        text_box(ids.next(), "Watermark", self.geometry.watermark(), "b", &paragraph)
    }

    /// One paragraph with a single run
    fn paragraph(
        &self,
        text: &str,
        align: Align,
        run: RunStyle,
        space_before: Option<u32>,
        bullet: bool,
    ) -> String {
        let mut ppr_children = String::new();
        if let Some(points) = space_before {
            ppr_children.push_str(&format!(
                "<a:spcBef><a:spcPts val=\"{}\"/></a:spcBef>",
                points.saturating_mul(100)
            ));
        }

        let ppr_attrs = if bullet {
            ppr_children.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
            format!(
                r#" marL="{}" indent="-{}" algn="{}""#,
                BULLET_INDENT_EMU,
                BULLET_INDENT_EMU,
                align.as_ooxml()
            )
        } else {
            ppr_children.push_str("<a:buNone/>");
            format!(r#" algn="{}""#, align.as_ooxml())
        };

        let color = match run.alpha {
            Some(alpha) => format!(
                r#"<a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr>"#,
                run.color.to_hex(),
                alpha
            ),
            None => format!(r#"<a:srgbClr val="{}"/>"#, run.color.to_hex()),
        };

        format!(
            r#"          <a:p>
            <a:pPr{}>{}</a:pPr>
            <a:r>
              <a:rPr lang="{}" sz="{}" b="{}" dirty="0"><a:solidFill>{}</a:solidFill></a:rPr>
              <a:t>{}</a:t>
            </a:r>
          </a:p>
"#,
            ppr_attrs,
            ppr_children,
            xml_text(&self.locale),
            run.size.saturating_mul(100),
            u8::from(run.bold),
            color,
            xml_text(text)
        )
    }
}

/// Hanging indent for bullet paragraphs (0.375")
const BULLET_INDENT_EMU: i64 = 342_900;

/// Render with default fonts and no image source
pub fn render(deck: &Deck, style: &StyleConfig, watermark_requested: bool) -> Result<RenderedDeck> {
    DeckRenderer::new().render(deck, style, watermark_requested)
}

/// `<a:xfrm>` for a rectangle
fn xfrm(rect: Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

/// Free-standing text box
fn text_box(id: u32, name: &str, rect: Rect, anchor: &str, paragraphs: &str) -> String {
    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="{} {}"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          {}
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
          <a:noFill/>
        </p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" rtlCol="0" anchor="{}"><a:noAutofit/></a:bodyPr>
          <a:lstStyle/>
{}        </p:txBody>
      </p:sp>
"#,
        id,
        name,
        id,
        xfrm(rect),
        anchor,
        paragraphs
    )
}

/// Picture referencing the slide's image relationship (always rId2)
fn picture_shape(id: u32, rect: Rect) -> String {
    format!(
        r#"      <p:pic>
        <p:nvPicPr>
          <p:cNvPr id="{}" name="Picture {}"/>
          <p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
          <p:nvPr/>
        </p:nvPicPr>
        <p:blipFill>
          <a:blip r:embed="rId2"/>
          <a:stretch><a:fillRect/></a:stretch>
        </p:blipFill>
        <p:spPr>
          {}
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
      </p:pic>
"#,
        id,
        id,
        xfrm(rect)
    )
}

/// DrawingML fill for the slide background
fn background_fill(background: &Background) -> String {
    match background {
        Background::Solid { color } => format!(
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            color.to_hex()
        ),
        // Linear, top to bottom
        Background::Gradient { color1, color2 } => format!(
            r#"<a:gradFill rotWithShape="1"><a:gsLst><a:gs pos="0"><a:srgbClr val="{}"/></a:gs><a:gs pos="100000"><a:srgbClr val="{}"/></a:gs></a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>"#,
            color1.to_hex(),
            color2.to_hex()
        ),
        Background::Pattern { color1, color2 } => format!(
            r#"<a:pattFill prst="dkDnDiag"><a:fgClr><a:srgbClr val="{}"/></a:fgClr><a:bgClr><a:srgbClr val="{}"/></a:bgClr></a:pattFill>"#,
            color1.to_hex(),
            color2.to_hex()
        ),
    }
}

/// Escape text for XML content, dropping characters XML 1.0 forbids
fn xml_text(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .filter(|c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

/// Check a generated part parses before it goes into the package
fn ensure_well_formed(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(RenderError::Xml(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use crate::style::ThemeRegistry;
    use std::io::Read;
    use zip::ZipArchive;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    struct FixedImage;

    impl ImageSource for FixedImage {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn fetch(&self, _prompt: &ImagePrompt) -> std::result::Result<Vec<u8>, ImageError> {
            Ok(PNG_MAGIC.to_vec())
        }
    }

    fn sample_deck() -> Deck {
        Deck::from_slides(vec![
            SlideRecord::title_slide("AI in 2024", Some("The future is now".to_string())),
            SlideRecord::content_slide("Applications", ["Healthcare", "Finance", "Education"]),
        ])
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_render_produces_valid_zip() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();

        assert_eq!(rendered.slide_count(), 2);
        let mut archive = ZipArchive::new(Cursor::new(rendered.as_bytes())).unwrap();
        assert!(archive.by_name("ppt/presentation.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide1.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide2.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide3.xml").is_err());
    }

    #[test]
    fn test_widescreen_slide_size() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        let presentation = read_part(rendered.as_bytes(), "ppt/presentation.xml");

        assert!(presentation.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
    }

    #[test]
    fn test_core_properties_use_deck_title() {
        let renderer = DeckRenderer::new().with_author("Ada & Co");
        let rendered = renderer
            .render(&sample_deck(), &StyleConfig::default(), false)
            .unwrap();
        let core = read_part(rendered.as_bytes(), "docProps/core.xml");

        assert!(core.contains("<dc:title>AI in 2024</dc:title>"));
        assert!(core.contains("<dc:creator>Ada &amp; Co</dc:creator>"));
    }

    #[test]
    fn test_title_slide_text() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        let slide = read_part(rendered.as_bytes(), "ppt/slides/slide1.xml");

        assert!(slide.contains("<a:t>AI in 2024</a:t>"));
        assert!(slide.contains("<a:t>The future is now</a:t>"));
        assert!(slide.contains(r#"sz="4400""#));
        assert!(slide.contains(r#"sz="3200""#));
        assert!(slide.contains(r#"algn="ctr""#));
    }

    #[test]
    fn test_content_slide_bullets() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        let slide = read_part(rendered.as_bytes(), "ppt/slides/slide2.xml");

        assert_eq!(slide.matches("<a:buChar").count(), 3);
        // Spacing before every bullet except the first
        assert_eq!(slide.matches(r#"<a:spcPts val="1200"/>"#).count(), 2);
        assert!(slide.contains(r#"sz="4000""#));
        assert!(slide.contains(r#"sz="2400""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let deck = Deck::from_slides(vec![
            SlideRecord::new("R&D <2024>"),
            SlideRecord::content_slide("Q&A", ["\"quoted\" & 'single'\u{0007}"]),
        ]);
        let rendered = render(&deck, &StyleConfig::default(), false).unwrap();

        let slide1 = read_part(rendered.as_bytes(), "ppt/slides/slide1.xml");
        assert!(slide1.contains("R&amp;D &lt;2024&gt;"));

        let slide2 = read_part(rendered.as_bytes(), "ppt/slides/slide2.xml");
        assert!(slide2.contains("&quot;quoted&quot; &amp; &apos;single&apos;</a:t>"));
        assert!(!slide2.contains('\u{0007}'));
    }

    #[test]
    fn test_background_variants() {
        let registry = ThemeRegistry::builtin();
        let cases = [
            ("default", "<a:solidFill><a:srgbClr val=\"FFFFFF\"/>"),
            ("modern", "<a:gradFill"),
            ("blueprint", "<a:pattFill prst=\"dkDnDiag\">"),
        ];

        for (theme, expected) in cases {
            let style = registry.resolve(theme, &Default::default()).unwrap();
            let rendered = render(&sample_deck(), &style, false).unwrap();
            let slide = read_part(rendered.as_bytes(), "ppt/slides/slide2.xml");

            assert!(slide.contains(expected), "{theme}: {slide}");
            assert!(slide.find("<p:bg>").unwrap() < slide.find("<p:spTree>").unwrap());
        }
    }

    #[test]
    fn test_watermark_is_last_shape() {
        let renderer = DeckRenderer::new().with_watermark_text("Made here");
        let rendered = renderer
            .render(&sample_deck(), &StyleConfig::default(), true)
            .unwrap();

        for part in ["ppt/slides/slide1.xml", "ppt/slides/slide2.xml"] {
            let slide = read_part(rendered.as_bytes(), part);
            let watermark = slide.find("<a:t>Made here</a:t>").unwrap();

            assert!(slide[watermark..].find("<p:sp>").is_none());
            assert!(slide.contains(r#"<a:alpha val="60000"/>"#));
            assert!(slide.contains(r#"algn="r""#));
        }
    }

    #[test]
    fn test_no_watermark_unless_requested() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        let slide = read_part(rendered.as_bytes(), "ppt/slides/slide2.xml");

        assert!(!slide.contains(DEFAULT_WATERMARK_TEXT));
    }

    #[test]
    fn test_images_embedded() {
        let renderer = DeckRenderer::new().with_image_source(FixedImage);
        let rendered = renderer
            .render(&sample_deck(), &StyleConfig::default(), false)
            .unwrap();

        let title = read_part(rendered.as_bytes(), "ppt/slides/slide1.xml");
        // Full-bleed image comes before the title text
        assert!(title.find("<p:pic>").unwrap() < title.find("AI in 2024").unwrap());

        let rels = read_part(rendered.as_bytes(), "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image2.png"));

        let mut archive = ZipArchive::new(Cursor::new(rendered.as_bytes())).unwrap();
        assert!(archive.by_name("ppt/media/image1.png").is_ok());
        assert!(archive.by_name("ppt/media/image2.png").is_ok());
    }

    #[test]
    fn test_suggested_file_name() {
        let rendered = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        let name = rendered.suggested_file_name();

        assert!(name.starts_with("presentation_"));
        assert!(name.ends_with(".pptx"));
        assert_eq!(name.len(), "presentation_".len() + 12 + ".pptx".len());

        // Same input, same bytes, same name
        let again = render(&sample_deck(), &StyleConfig::default(), false).unwrap();
        assert_eq!(again.suggested_file_name(), name);
    }

    #[test]
    fn test_ensure_well_formed() {
        assert!(ensure_well_formed("<a><b/></a>").is_ok());
        assert!(matches!(
            ensure_well_formed("<a></b>"),
            Err(RenderError::Xml(_))
        ));
    }

    #[test]
    fn test_xml_text() {
        assert_eq!(xml_text("Hello & World"), "Hello &amp; World");
        assert_eq!(xml_text("<tag>"), "&lt;tag&gt;");
        assert_eq!(xml_text("bell\u{0007}"), "bell");
        assert_eq!(xml_text("odd\u{FFFE}\u{FFFF} end"), "odd end");
    }

    #[test]
    fn test_noncharacters_dropped_from_slides() {
        let deck = Deck::from_slides(vec![SlideRecord::new("Broken\u{FFFF} Title")]);
        let rendered = render(&deck, &StyleConfig::default(), false).unwrap();

        let slide = read_part(rendered.as_bytes(), "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:t>Broken Title</a:t>"));
        assert!(!slide.contains('\u{FFFF}'));
    }

    #[test]
    fn test_empty_deck_is_rejected() {
        let err = render(&Deck::new(), &StyleConfig::default(), false).unwrap_err();

        assert!(matches!(err, RenderError::EmptyDeck));
        assert_eq!(err.code(), "RENDER005");
    }

    #[test]
    fn test_oversized_fonts_are_clamped() {
        let fonts = FontSizes {
            content_title: 50_000_000,
            bullet_spacing: u32::MAX,
            ..FontSizes::default()
        };
        let renderer = DeckRenderer::new().with_fonts(fonts);

        assert_eq!(renderer.fonts().content_title, 4000);

        let rendered = renderer
            .render(&sample_deck(), &StyleConfig::default(), false)
            .unwrap();
        let slide = read_part(rendered.as_bytes(), "ppt/slides/slide2.xml");
        assert!(slide.contains(r#"sz="400000""#));
        assert!(slide.contains(r#"<a:spcPts val="158400"/>"#));
    }
}
