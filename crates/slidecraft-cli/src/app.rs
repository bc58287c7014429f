//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use slidecraft_deck::{Deck, DeckConfig, StyleOverrides, ThemeRegistry};

/// Context attached to every rendering failure
const RENDER_FAILED: &str = "failed to create presentation file";

/// Output format for the parse command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable outline
    #[default]
    Text,
    /// JSON slide array (accepted back as input)
    Json,
}

#[derive(Parser)]
#[command(name = "slidecraft")]
#[command(author, version, about = "Slide decks from generated text", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a PPTX deck from generated text or a JSON slide array
    Build {
        /// Input file ("-" for stdin)
        input: PathBuf,

        /// Output PPTX file (defaults to a content-hash name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Theme name
        #[arg(short, long)]
        theme: Option<String>,

        /// JSON file with custom colours and background
        #[arg(short, long)]
        style: Option<PathBuf>,

        /// Add the watermark to every slide
        #[arg(long)]
        watermark: bool,

        /// Keep at most this many slides (at least 1)
        #[arg(long, value_parser = parse_slide_limit)]
        max_slides: Option<usize>,

        /// Fetch an image for each slide
        #[arg(long)]
        images: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the slides parsed from generated text
    Parse {
        /// Input file ("-" for stdin)
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available themes
    Themes {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Options for the build command
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Input file ("-" for stdin)
    pub input: PathBuf,

    /// Output file; `None` writes the suggested name into the current directory
    pub output: Option<PathBuf>,

    /// Theme name, overriding the configured one
    pub theme: Option<String>,

    /// JSON style overrides file
    pub style: Option<PathBuf>,

    /// Watermark every slide
    pub watermark: bool,

    /// Slide-count entitlement
    pub max_slides: Option<usize>,

    /// Fetch slide images
    pub images: bool,

    /// Configuration file
    pub config: Option<PathBuf>,
}

impl BuildOptions {
    /// Options for an input with everything else defaulted
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Set the output file
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Set the watermark flag
    pub fn with_watermark(mut self, watermark: bool) -> Self {
        self.watermark = watermark;
        self
    }

    /// Set the slide-count entitlement
    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = Some(max_slides);
        self
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            input,
            output,
            theme,
            style,
            watermark,
            max_slides,
            images,
            config,
        } => {
            let options = BuildOptions {
                input,
                output,
                theme,
                style,
                watermark,
                max_slides,
                images,
                config,
            };
            let written = build_command(&options)?;
            println!("{}", written.display());
        }
        Commands::Parse {
            input,
            format,
            config,
        } => {
            parse_command(&input, format, config.as_deref())?;
        }
        Commands::Themes { config } => {
            themes_command(config.as_deref())?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; library `log` records are bridged
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the build command, returning the path written
pub fn build_command(options: &BuildOptions) -> Result<PathBuf> {
    let config = load_config(options.config.as_deref())?;
    let text = read_input(&options.input)?;

    let parser = config
        .content_parser()
        .context("Invalid [parser] configuration")?;
    let mut deck = parser.parse(&text)?;

    if let Some(max) = options.max_slides {
        let removed = deck.truncate_to(max);
        if removed > 0 {
            info!("Dropped {} slides beyond the limit of {}", removed, max);
        }
    }

    let registry = config.theme_registry().context(RENDER_FAILED)?;
    let overrides = match &options.style {
        Some(path) => load_style_file(path)?.layered_over(&config.style.overrides),
        None => config.style.overrides.clone(),
    };
    let theme = options.theme.as_deref().unwrap_or(&config.style.theme);
    let style = registry.resolve(theme, &overrides).context(RENDER_FAILED)?;
    debug!("Resolved style for theme '{}': {:?}", theme, style);

    let mut renderer = config.renderer();
    if options.images || config.images.enabled {
        match config.http_image_source() {
            Ok(source) => renderer = renderer.with_image_source(source),
            Err(e) => warn!("Image generation unavailable, continuing without images: {}", e),
        }
    }

    let pptx = renderer
        .render(&deck, &style, options.watermark)
        .context(RENDER_FAILED)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(pptx.suggested_file_name()));
    pptx.write_to(&output)
        .with_context(|| format!("{}: {}", RENDER_FAILED, output.display()))?;

    info!("Wrote {} slides to {}", pptx.slide_count(), output.display());
    Ok(output)
}

/// Execute the parse command
pub fn parse_command(input: &Path, format: OutputFormat, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let text = read_input(input)?;

    let deck = config
        .content_parser()
        .context("Invalid [parser] configuration")?
        .parse(&text)?;

    match format {
        OutputFormat::Text => print!("{}", format_deck(&deck)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&deck)?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Execute the themes command
pub fn themes_command(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let registry = config
        .theme_registry()
        .context("Invalid [themes] configuration")?;

    print!("{}", format_themes(&registry));
    Ok(())
}

/// Human-readable outline of a deck
pub fn format_deck(deck: &Deck) -> String {
    let mut out = String::new();

    for (i, slide) in deck.iter().enumerate() {
        let layout = if i == 0 { "title" } else { "content" };
        out.push_str(&format!("Slide {} [{}]: {}\n", i + 1, layout, slide.title));

        if let Some(subtitle) = &slide.subtitle {
            out.push_str(&format!("  {}\n", subtitle));
        }
        for bullet in &slide.bullets {
            out.push_str(&format!("  • {}\n", bullet));
        }
    }

    out
}

/// Theme table: name, background variant, title and text colours
pub fn format_themes(registry: &ThemeRegistry) -> String {
    let mut out = String::new();

    for (name, style) in registry.iter() {
        out.push_str(&format!(
            "{:<12} {:<9} title {}  text {}\n",
            name,
            style.background.kind().name(),
            style.title_color,
            style.text_color
        ));
    }

    out
}

/// Slide limits below one would leave nothing to render
fn parse_slide_limit(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

/// Load the configuration file, or defaults when none is given
fn load_config(path: Option<&Path>) -> Result<DeckConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            DeckConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))
        }
        None => Ok(DeckConfig::default()),
    }
}

/// Load custom style fields from a JSON file
fn load_style_file(path: &Path) -> Result<StyleOverrides> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read style file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid style file: {}", path.display()))
}

/// Read the generated text from a file or stdin
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    fs::read_to_string(input).with_context(|| format!("Failed to read input: {}", input.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidecraft_deck::SlideRecord;

    #[test]
    fn test_cli_parse_build() {
        let args = vec![
            "slidecraft",
            "build",
            "slides.txt",
            "--output",
            "deck.pptx",
            "--theme",
            "modern",
            "--watermark",
            "--max-slides",
            "5",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                input,
                output,
                theme,
                style,
                watermark,
                max_slides,
                images,
                config,
            } => {
                assert_eq!(input, PathBuf::from("slides.txt"));
                assert_eq!(output, Some(PathBuf::from("deck.pptx")));
                assert_eq!(theme.as_deref(), Some("modern"));
                assert!(style.is_none());
                assert!(watermark);
                assert_eq!(max_slides, Some(5));
                assert!(!images);
                assert!(config.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_build_stdin_defaults() {
        let args = vec!["slidecraft", "build", "-"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                input,
                output,
                watermark,
                max_slides,
                ..
            } => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(output.is_none());
                assert!(!watermark);
                assert!(max_slides.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_parse_json() {
        let args = vec!["slidecraft", "parse", "slides.txt", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Parse { input, format, .. } => {
                assert_eq!(input, PathBuf::from("slides.txt"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["slidecraft", "themes", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Themes { config: None }));
    }

    #[test]
    fn test_cli_rejects_bad_max_slides() {
        let result = Cli::try_parse_from(["slidecraft", "build", "x.txt", "--max-slides", "many"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["slidecraft", "build", "x.txt", "--max-slides", "0"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["slidecraft", "build", "x.txt", "--max-slides", "1"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_format_deck() {
        let deck = Deck::from_slides(vec![
            SlideRecord::title_slide("AI in 2024", Some("The future is now".to_string())),
            SlideRecord::content_slide("Applications", ["Healthcare", "Finance"]),
        ]);

        let text = format_deck(&deck);
        assert_eq!(
            text,
            "Slide 1 [title]: AI in 2024\n  The future is now\n\
             Slide 2 [content]: Applications\n  • Healthcare\n  • Finance\n"
        );
    }

    #[test]
    fn test_format_themes_lists_builtins() {
        let text = format_themes(&ThemeRegistry::builtin());

        for name in ["default", "modern", "dark", "corporate", "nature", "blueprint"] {
            assert!(text.lines().any(|l| l.starts_with(name)), "missing {name}");
        }
        assert!(text.contains("gradient"));
        assert!(text.contains("pattern"));
    }

    #[test]
    fn test_load_config_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.style.theme, "default");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/nonexistent/slides.txt")).unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }
}
