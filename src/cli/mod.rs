//! Command-line front-end for the GeoNet client.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quake list` | Recent quakes, filtered by MMI, magnitude and limit |
//! | `quake get ID` | One quake |
//! | `quake history ID` | Revisions of a quake's solution |
//! | `quake stats` | Counts by magnitude and per-day rates |
//! | `quake health` | API reachability and latency |
//! | `quake intensity` | Reported or measured shaking intensity |
//! | `quake strong-motion ID` | Strong-motion station readings |
//! | `quake cap-feed` / `cap-alert ID` | CAP alerts |
//! | `volcano alerts` | Volcanic alert levels |
//! | `volcano quakes ID` | Quakes near a volcano |
//!
//! # Examples
//!
//! ```bash
//! gnet quake list --min-magnitude 4 --limit 5
//! gnet --format json q get 2016p858000
//! gnet --format csv --output alerts.csv volcano alerts
//! ```

mod commands;
mod error;
mod output;

pub use error::CliError;

use clap::{Args, Parser, Subcommand};
use gnet::models::{Aggregation, IntensityKind};
use gnet::ClientBuilder;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use self::output::{Output, OutputFormat};

/// Query the GeoNet earthquake, volcano and intensity API.
#[derive(Debug, Parser)]
#[command(name = "gnet", version, about)]
pub struct Cli {
    /// Log requests and retries to stderr and show error details.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// API base URL [env: GEONET_API_URL].
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-attempt timeout in seconds [env: GEONET_TIMEOUT].
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries after a transient failure [env: GEONET_RETRIES].
    #[arg(long, global = true, value_name = "N")]
    pub retries: Option<usize>,

    #[command(subcommand)]
    pub command: Group,
}

#[derive(Debug, Subcommand)]
pub enum Group {
    /// Earthquake information.
    #[command(subcommand, visible_alias = "q")]
    Quake(QuakeCommand),

    /// Volcano information.
    #[command(subcommand, visible_alias = "v")]
    Volcano(VolcanoCommand),
}

#[derive(Debug, Subcommand)]
pub enum QuakeCommand {
    /// List recent quakes.
    List(ListArgs),

    /// Show one quake.
    Get {
        /// Quake public ID, e.g. 2016p858000.
        id: String,
    },

    /// Show every revision of a quake's solution.
    History {
        /// Quake public ID.
        id: String,
    },

    /// Show quake counts by magnitude.
    Stats,

    /// Check the API is reachable.
    Health,

    /// Show shaking intensity.
    Intensity(IntensityArgs),

    /// Show strong-motion station readings for a quake.
    StrongMotion(StrongMotionArgs),

    /// List current CAP alerts.
    CapFeed,

    /// Print one CAP alert document.
    CapAlert {
        /// CAP identifier from the feed.
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Maximum number of quakes (0 for all).
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Server-side MMI filter, -1 to 8.
    #[arg(long, allow_negative_numbers = true)]
    pub mmi: Option<i32>,

    /// Minimum magnitude, inclusive.
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum magnitude, inclusive.
    #[arg(long)]
    pub max_magnitude: Option<f64>,

    /// Minimum MMI; quakes without an MMI are dropped.
    #[arg(long, allow_negative_numbers = true)]
    pub min_mmi: Option<i32>,

    /// Maximum MMI; quakes without an MMI are dropped.
    #[arg(long, allow_negative_numbers = true)]
    pub max_mmi: Option<i32>,
}

#[derive(Debug, Args)]
pub struct IntensityArgs {
    /// reported or measured.
    #[arg(default_value = "reported")]
    pub kind: IntensityKind,

    /// Restrict to one quake.
    #[arg(long = "publicid", value_name = "ID")]
    pub public_id: Option<String>,

    /// max or median; reported intensity only.
    #[arg(long)]
    pub aggregation: Option<Aggregation>,
}

#[derive(Debug, Args)]
pub struct StrongMotionArgs {
    /// Quake public ID.
    pub id: String,

    /// Keep stations of this network.
    #[arg(long)]
    pub network: Option<String>,

    /// Keep stations with at least this MMI.
    #[arg(long)]
    pub min_mmi: Option<f64>,

    /// Keep stations within this distance of the epicentre, in km.
    #[arg(long, value_name = "KM")]
    pub max_distance: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum VolcanoCommand {
    /// Show volcanic alert levels.
    Alerts {
        /// Only this volcano, e.g. ruapehu.
        #[arg(long)]
        volcano: Option<String>,

        /// Only volcanoes at or above this alert level, 0 to 5.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
        min_level: Option<u8>,
    },

    /// List quakes near a volcano.
    Quakes {
        /// Volcano ID, e.g. ruapehu.
        id: String,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        min_magnitude: Option<f64>,
    },
}

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    init_tracing(cli.verbose);

    let client = build_client(&cli)?;
    let output = Output::new(cli.format, cli.output);

    match &cli.command {
        Group::Quake(command) => commands::quake(&client, command, &output).await,
        Group::Volcano(command) => commands::volcano(&client, command, &output).await,
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` enables debug logs for this crate.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "gnet=debug" } else { "off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_client(cli: &Cli) -> Result<gnet::Client, CliError> {
    let mut builder = ClientBuilder::from_env()?;

    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url)?;
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = cli.retries {
        builder = builder.max_retries(retries);
    }

    Ok(builder.build()?)
}
