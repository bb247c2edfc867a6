use crate::config::{Config, load_config};
use crate::emitter::NumberFormat;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::scene::parse_scene;
use crate::source::{DataSource, IoDataSource};
use crate::theme::Theme;
use crate::xml::{XmlEntityKind, XmlReader};
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "svgw", version, about = "Streaming SVG writer and XML entity inspector")]
pub struct Args {
    /// Log debug events to stderr (overrides RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a JSON/JSON5 scene to SVG or PNG
    Draw(DrawArgs),
    /// List the XML entities of a document
    Inspect(InspectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct DrawArgs {
    /// Scene file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width, used when the scene does not set one
    #[arg(short = 'w', long = "width")]
    pub width: Option<i32>,

    /// Canvas height, used when the scene does not set one
    #[arg(short = 'H', long = "height")]
    pub height: Option<i32>,

    /// Theme preset (plain, modern)
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Decimal places for coordinates; shortest round-trip text if omitted
    #[arg(short = 'p', long = "precision")]
    pub precision: Option<u8>,
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// XML file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Do not list character data
    #[arg(long = "skip-cdata")]
    pub skip_cdata: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Totals reported at the end of `inspect`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InspectSummary {
    pub elements: usize,
    pub char_data: usize,
    pub max_depth: usize,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Draw(draw) => run_draw(draw),
        Command::Inspect(inspect) => run_inspect(inspect),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_draw(args: DrawArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;
    tracing::debug!(shapes = scene.shape_count(), "scene parsed");

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&scene, &config, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&scene, &config)?;
            write_png(&svg, &output, &config)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn apply_overrides(config: &mut Config, args: &DrawArgs) -> Result<()> {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            Theme::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown theme: {name}"))?;
    }
    if let Some(precision) = args.precision {
        config.render.number_format = NumberFormat::Fixed(precision);
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let reader: Box<dyn Read> = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => Box::new(BufReader::new(File::open(path)?)),
        _ => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = inspect_entities(IoDataSource::new(reader), &mut out, args.skip_cdata)?;
    writeln!(
        out,
        "{} elements, {} character data runs, max depth {}",
        summary.elements, summary.char_data, summary.max_depth
    )?;
    Ok(())
}

/// Writes one line per entity read from `source` and returns the totals.
pub fn inspect_entities<S: DataSource, W: Write>(
    source: S,
    out: &mut W,
    skip_cdata: bool,
) -> Result<InspectSummary> {
    let mut reader = XmlReader::new(source);
    let mut summary = InspectSummary::default();
    let mut depth = 0usize;
    while let Some(entity) = reader.read_entity(skip_cdata)? {
        match entity.kind {
            XmlEntityKind::StartElement => {
                writeln!(out, "{}start {}", indent(depth), entity.name_data)?;
                depth += 1;
                summary.elements += 1;
                summary.max_depth = summary.max_depth.max(depth);
                for (name, value) in entity.attributes.iter() {
                    writeln!(out, "{}@{name}={value:?}", indent(depth))?;
                }
            }
            XmlEntityKind::EndElement => {
                depth = depth.saturating_sub(1);
                writeln!(out, "{}end {}", indent(depth), entity.name_data)?;
            }
            XmlEntityKind::CharData => {
                summary.char_data += 1;
                let text = entity.name_data.trim();
                if !text.is_empty() {
                    writeln!(out, "{}text {text:?}", indent(depth))?;
                }
            }
        }
    }
    Ok(summary)
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
