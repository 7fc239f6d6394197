use crate::config::toml_config::FileConfig;
use crate::config::{parse_query_pair, Settings};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PATH: &str = "./data";

#[derive(Debug, Parser)]
#[command(name = "fx-ingest")]
#[command(about = "Fetch exchange rates and append them to the raw data layer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to an optional TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one ingestion, as the scheduler would
    Run(RunArgs),
    /// List stored objects as raw table rows
    Ls(StorageArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Exchange-rate endpoint
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Query parameter as key=value; repeat for several
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct StorageArgs {
    /// Local directory acting as the object store
    #[arg(long)]
    pub output_path: Option<String>,

    /// Key prefix for raw objects
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Settings plus where the local object store lives.
#[derive(Debug, Clone, PartialEq)]
pub struct CliSettings {
    pub settings: Settings,
    pub output_path: String,
}

impl Validate for CliSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        self.settings.validate()
    }
}

/// Flag > settings file > built-in default, field by field.
pub fn resolve(
    file: Option<&FileConfig>,
    source: &SourceArgs,
    storage: &StorageArgs,
) -> Result<CliSettings> {
    let defaults = Settings::default();
    let file = file.cloned().unwrap_or_default();

    let query = if !source.query.is_empty() {
        source
            .query
            .iter()
            .map(|pair| parse_query_pair(pair))
            .collect::<Result<Vec<_>>>()?
    } else {
        file.query_pairs()?.unwrap_or(defaults.query)
    };

    let settings = Settings {
        api_endpoint: source
            .api_endpoint
            .clone()
            .or(file.source.endpoint)
            .unwrap_or(defaults.api_endpoint),
        query,
        raw_prefix: storage
            .prefix
            .clone()
            .or(file.storage.prefix)
            .unwrap_or(defaults.raw_prefix),
        request_timeout_secs: source.timeout_secs.or(file.source.timeout_seconds),
    };

    Ok(CliSettings {
        settings,
        output_path: storage
            .output_path
            .clone()
            .or(file.storage.output_path)
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
    })
}
