use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wokescope_core::config_file::{self, ConfigFile};
use wokescope_parsing::{
    ParsedRow, ParsingConfig, ParsingConfigBuilder, RawRow, RowParser, read_csv_rows,
    read_json_rows,
};

mod artifacts;
mod output;

use output::ColorMode;

/// Wokescope - build dashboard data from scored business-journal metadata
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "WOKESCOPE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform/CWD cascade
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a CSV or JSON dataset and write the dashboard's JSON artifacts
    Build {
        /// Path to the dataset (.csv, or .json rows / row chunk)
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "public/data")]
        out: PathBuf,

        /// Year separating the early and late periods of emerging keywords
        #[arg(long)]
        split_year: Option<i32>,

        /// Minimum scored papers for an author to be ranked
        #[arg(long)]
        min_author_pubs: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Dry run: print each row's raw byline next to the extracted names
    Inspect {
        /// Path to the dataset (.csv, or .json rows / row chunk)
        input: PathBuf,

        /// Stop after this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Only show rows where at least one chunk was rejected
        #[arg(long)]
        rejected_only: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Write a config file populated with the built-in aggregation defaults
    InitConfig {
        /// Destination (defaults to the platform config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let config = load_settings(cli.config.as_deref())?;
    let parsing = parsing_config(&config)?;

    match cli.command {
        Command::Build {
            input,
            out,
            split_year,
            min_author_pubs,
            no_color,
        } => {
            let mut settings = config.aggregation_settings();
            if let Some(year) = split_year {
                settings.split_year = year;
            }
            if let Some(n) = min_author_pubs {
                settings.min_author_pubs = n;
            }
            build(&input, &out, &parsing, &settings, ColorMode(!no_color))
        }
        Command::Inspect {
            input,
            limit,
            rejected_only,
            no_color,
        } => inspect(&input, &parsing, limit, rejected_only, ColorMode(!no_color)),
        Command::InitConfig { path, force } => init_config(path, force),
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let defaults = config_file::AggregationSettings::default();
    let config = ConfigFile {
        extraction: Some(config_file::ExtractionConfig::default()),
        aggregation: Some(config_file::AggregationConfig {
            split_year: Some(defaults.split_year),
            min_author_pubs: Some(defaults.min_author_pubs),
            top_keywords: Some(defaults.top_keywords),
            word_cloud_limit: Some(defaults.word_cloud_limit),
            moving_average_window: Some(defaults.moving_average_window),
        }),
    };

    let existing = path.clone().or_else(config_file::config_path);
    if let Some(existing) = existing.filter(|p| p.exists() && !force) {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            existing.display()
        );
    }

    let written = match path {
        Some(path) => {
            config_file::save_to_path(&config, &path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            path
        }
        None => config_file::save_config(&config)?,
    };
    println!("Wrote {}", written.display());
    Ok(())
}

/// Explicit `--config` wins; otherwise cascade CWD over the platform file.
fn load_settings(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            config_file::load_from_path(path)
                .with_context(|| format!("Could not parse config file {}", path.display()))
        }
        None => Ok(config_file::load_config()),
    }
}

fn parsing_config(config: &ConfigFile) -> anyhow::Result<ParsingConfig> {
    let mut builder = ParsingConfigBuilder::new();
    if let Some(extraction) = &config.extraction {
        builder = builder.apply_file_config(extraction);
    }
    builder
        .build()
        .context("Invalid editorial_note_pattern in [extraction] config")
}

fn load_raw_rows(input: &Path) -> anyhow::Result<Vec<RawRow>> {
    if !input.exists() {
        anyhow::bail!("Input dataset not found: {}", input.display());
    }
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let is_json = input
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let rows = if is_json {
        read_json_rows(&text)
    } else {
        read_csv_rows(&text)
    }
    .with_context(|| format!("Failed to parse {}", input.display()))?;

    tracing::info!(path = %input.display(), rows = rows.len(), "loaded dataset");
    Ok(rows)
}

fn load_rows(input: &Path, parser: &RowParser) -> anyhow::Result<Vec<ParsedRow>> {
    Ok(load_raw_rows(input)?
        .into_iter()
        .map(|raw| parser.parse_row(raw))
        .collect())
}

fn build(
    input: &Path,
    out: &Path,
    parsing: &ParsingConfig,
    settings: &config_file::AggregationSettings,
    color: ColorMode,
) -> anyhow::Result<()> {
    let rows = load_rows(input, &RowParser::with_config(parsing))?;
    if rows.is_empty() {
        anyhow::bail!("No rows parsed from {}", input.display());
    }

    let built = artifacts::build_artifacts(&rows, settings);
    let written = artifacts::write_artifacts(out, built, input)?;

    let mut stdout = std::io::stdout();
    output::print_build_summary(&mut stdout, out, rows.len(), &written, color)?;
    Ok(())
}

fn inspect(
    input: &Path,
    parsing: &ParsingConfig,
    limit: Option<usize>,
    rejected_only: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let raw_rows = load_raw_rows(input)?;
    let parser = RowParser::with_config(parsing);
    let mut writer = std::io::stdout().lock();

    output::print_inspect_header(&mut writer, input, raw_rows.len(), color)?;

    let mut shown = 0usize;
    let mut totals = output::InspectTotals::default();
    for (i, raw) in raw_rows.into_iter().enumerate() {
        let (row, extraction) = parser.parse_row_detailed(raw);
        totals.add(&extraction);
        if rejected_only && extraction.chunks_rejected == 0 {
            continue;
        }
        if limit.is_some_and(|n| shown >= n) {
            continue;
        }
        output::print_inspect_row(&mut writer, i, &row, &extraction, color)?;
        shown += 1;
    }

    output::print_inspect_totals(&mut writer, &totals, color)?;
    writer.flush()?;
    Ok(())
}
