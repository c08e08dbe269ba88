use clap::Parser;
use scenematch::io::{load_image, ColorMode};
use scenematch::{Match, MatchConfig, Matcher, Method};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "scenematch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum MethodConfig {
    Sqdiff,
    SqdiffNormed,
    Ccorr,
    CcorrNormed,
    Ccoeff,
    #[default]
    CcoeffNormed,
}

impl From<MethodConfig> for Method {
    fn from(value: MethodConfig) -> Self {
        match value {
            MethodConfig::Sqdiff => Method::SqDiff,
            MethodConfig::SqdiffNormed => Method::SqDiffNormed,
            MethodConfig::Ccorr => Method::CCorr,
            MethodConfig::CcorrNormed => Method::CCorrNormed,
            MethodConfig::Ccoeff => Method::CCoeff,
            MethodConfig::CcoeffNormed => Method::CCoeffNormed,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum ColorConfig {
    #[default]
    Gray,
    Rgb,
    Rgba,
}

impl From<ColorConfig> for ColorMode {
    fn from(value: ColorConfig) -> Self {
        match value {
            ColorConfig::Gray => ColorMode::Gray,
            ColorConfig::Rgb => ColorMode::Rgb,
            ColorConfig::Rgba => ColorMode::Rgba,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    method: MethodConfig,
    threshold: f64,
    max_matches: usize,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            method: MethodConfig::CcoeffNormed,
            threshold: cfg.threshold,
            max_matches: cfg.max_matches,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    scene_path: String,
    template_path: String,
    output_path: Option<String>,
    color: ColorConfig,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    score: f64,
}

impl From<Match> for MatchRecord {
    fn from(value: Match) -> Self {
        Self {
            x: value.location.x,
            y: value.location.y,
            width: value.width,
            height: value.height,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<MatchRecord>,
    matches: Vec<MatchRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("scenematch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.scene_path.is_empty() || config.template_path.is_empty() {
        return Err("scene_path and template_path must be set in the config".into());
    }
    if config.match_cfg.max_matches == 0 {
        return Err("match.max_matches must be at least 1".into());
    }

    let color = ColorMode::from(config.color);
    let scene = load_image(&config.scene_path, color)?;
    let template = load_image(&config.template_path, color)?;

    let matcher = Matcher::from_template(&template)?.with_config(MatchConfig {
        method: config.match_cfg.method.into(),
        threshold: config.match_cfg.threshold,
        max_matches: config.match_cfg.max_matches,
        parallel: config.match_cfg.parallel,
    });

    let matches = matcher.find_matches(&scene)?;
    let best = matches.first().copied().map(MatchRecord::from);
    let matches = matches.into_iter().map(MatchRecord::from).collect();
    let output = Output { best, matches };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
