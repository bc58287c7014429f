//! Integration tests for the slidecraft CLI
//!
//! These tests drive the build pipeline end to end: generated text on disk
//! in, a PPTX package on disk out.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::process::Command;

use slidecraft_cli::{build_command, BuildOptions};
use tempfile::TempDir;
use zip::ZipArchive;

const GENERATED: &str = "\
First Slide:
AI in 2024
• The future is now

Slide 2: Applications
• Healthcare
• Finance
• Education

Slide 3: Challenges
- Bias
- Cost

Slide 4: Outlook
* Regulation
* Adoption
";

fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_part(pptx: &Path, name: &str) -> String {
    let bytes = fs::read(pptx).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn slide_count(pptx: &Path) -> usize {
    let bytes = fs::read(pptx).unwrap();
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count()
}

#[test]
fn test_build_writes_deck() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let output = dir.path().join("deck.pptx");

    let options = BuildOptions::new(&input).with_output(&output).with_theme("corporate");
    let written = build_command(&options).unwrap();

    assert_eq!(written, output);
    assert_eq!(slide_count(&output), 4);

    let title = read_part(&output, "ppt/slides/slide1.xml");
    assert!(title.contains("<a:t>AI in 2024</a:t>"));
    assert!(title.contains("<a:t>The future is now</a:t>"));

    let slide = read_part(&output, "ppt/slides/slide3.xml");
    assert!(slide.contains("<a:t>Challenges</a:t>"));
    assert!(slide.contains("<a:t>Bias</a:t>"));
}

#[test]
fn test_build_enforces_slide_limit_and_watermark() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let output = dir.path().join("free.pptx");

    let options = BuildOptions::new(&input)
        .with_output(&output)
        .with_watermark(true)
        .with_max_slides(2);
    build_command(&options).unwrap();

    assert_eq!(slide_count(&output), 2);
    for i in 1..=2 {
        let slide = read_part(&output, &format!("ppt/slides/slide{i}.xml"));
        assert!(slide.contains("Created with Slidecraft"));
    }
}

#[test]
fn test_build_zero_slide_limit_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let output = dir.path().join("empty.pptx");

    let options = BuildOptions::new(&input)
        .with_output(&output)
        .with_max_slides(0);
    let err = build_command(&options).unwrap_err();

    assert!(format!("{err:#}").contains("failed to create presentation file"));
    assert!(!output.exists());
}

#[test]
fn test_build_with_style_file_and_config() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let style = write_input(
        &dir,
        "style.json",
        r##"{"titleColor": "#C0FFEE", "backgroundType": "gradient", "backgroundColor1": "000000", "backgroundColor2": "FFFFFF"}"##,
    );
    let config = write_input(
        &dir,
        "slidecraft.toml",
        "[meta]\nauthor = \"CLI Test\"\n\n[watermark]\ntext = \"Trial\"\n",
    );
    let output = dir.path().join("styled.pptx");

    let options = BuildOptions {
        style: Some(style),
        config: Some(config),
        watermark: true,
        ..BuildOptions::new(&input).with_output(&output)
    };
    build_command(&options).unwrap();

    let slide = read_part(&output, "ppt/slides/slide2.xml");
    assert!(slide.contains(r#"<a:srgbClr val="C0FFEE"/>"#));
    assert!(slide.contains("<a:gradFill"));
    assert!(slide.contains("<a:t>Trial</a:t>"));

    let core = read_part(&output, "docProps/core.xml");
    assert!(core.contains("<dc:creator>CLI Test</dc:creator>"));
}

#[test]
fn test_build_unknown_theme_still_renders() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let output = dir.path().join("galaxy.pptx");

    build_command(&BuildOptions::new(&input).with_output(&output).with_theme("galaxy")).unwrap();

    assert_eq!(slide_count(&output), 4);
}

#[test]
fn test_build_empty_input_fails_with_content_message() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.txt", "  \n\n  \n");
    let output = dir.path().join("never.pptx");

    let err = build_command(&BuildOptions::new(&input).with_output(&output)).unwrap_err();

    assert!(format!("{err:#}").contains("failed to generate presentation content"));
    assert!(!output.exists());
}

#[test]
fn test_build_bad_style_colour_fails_with_file_message() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);
    let style = write_input(&dir, "style.json", r#"{"title_color": "purple"}"#);
    let output = dir.path().join("never.pptx");

    let options = BuildOptions {
        style: Some(style),
        ..BuildOptions::new(&input).with_output(&output)
    };
    let err = build_command(&options).unwrap_err();

    assert!(format!("{err:#}").contains("failed to create presentation file"));
    assert!(!output.exists());
}

#[test]
fn test_build_json_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "slides.json",
        r#"[{"title": "Roadmap", "subtitle": "2025"}, {"title": "Q1", "bullets": ["Hire", "Ship"]}]"#,
    );
    let output = dir.path().join("json.pptx");

    build_command(&BuildOptions::new(&input).with_output(&output)).unwrap();

    let slide = read_part(&output, "ppt/slides/slide2.xml");
    assert!(slide.contains("<a:t>Ship</a:t>"));
}

#[test]
fn test_binary_parse_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);

    let output = Command::new(env!("CARGO_BIN_EXE_slidecraft"))
        .args(["parse", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let slides: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(slides.as_array().map(Vec::len), Some(4));
    assert_eq!(slides[1]["title"], "Applications");
}

#[test]
fn test_binary_build_default_name() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "slides.txt", GENERATED);

    let output = Command::new(env!("CARGO_BIN_EXE_slidecraft"))
        .current_dir(dir.path())
        .args(["build", "slides.txt"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let printed = String::from_utf8(output.stdout).unwrap();
    let name = printed.trim();
    assert!(name.starts_with("presentation_") && name.ends_with(".pptx"), "{name}");
    assert!(dir.path().join(name).exists());
    drop(input);
}

#[test]
fn test_binary_empty_input_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.txt", "");

    let output = Command::new(env!("CARGO_BIN_EXE_slidecraft"))
        .arg("build")
        .arg(&input)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to generate presentation content"));
}
