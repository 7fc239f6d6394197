use anyhow::Context;
use clap::Parser;
use fx_ingest::config::cli::{self, Cli, Command, RunArgs, SourceArgs, StorageArgs};
use fx_ingest::config::toml_config::FileConfig;
use fx_ingest::core::raw_scan::scan_raw_prefix;
use fx_ingest::utils::error::IngestError;
use fx_ingest::utils::{logger, validation::Validate};
use fx_ingest::{CliSettings, IngestEngine, Invocation, LocalStorage, RatePipeline, TriggerBody};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("Starting fx-ingest CLI");

    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            Some(
                FileConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
            )
        }
        None => None,
    };

    let result = match &args.command {
        Command::Run(run_args) => run(file_config.as_ref(), run_args).await,
        Command::Ls(storage_args) => list(file_config.as_ref(), storage_args).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

fn resolve_settings(
    file_config: Option<&FileConfig>,
    source: &SourceArgs,
    storage: &StorageArgs,
) -> Result<CliSettings, IngestError> {
    let resolved = cli::resolve(file_config, source, storage)?;
    resolved.validate()?;
    tracing::debug!("Resolved settings: {:?}", resolved);
    Ok(resolved)
}

async fn run(file_config: Option<&FileConfig>, args: &RunArgs) -> Result<(), IngestError> {
    let resolved = resolve_settings(file_config, &args.source, &args.storage)?;

    let storage = LocalStorage::new(&resolved.output_path);
    let pipeline = RatePipeline::new(storage, &resolved.settings)?;
    let engine = IngestEngine::new(pipeline);

    let response = Invocation::received().handle(&engine).await;
    println!("{}", response.body_json());

    match response.body {
        TriggerBody::Ok { path } => {
            println!("✅ Raw object written: {}", path);
            Ok(())
        }
        // The adapter already logged the cause.
        TriggerBody::Error { kind } => {
            eprintln!("❌ Ingestion failed ({}), HTTP {}", kind, response.status);
            std::process::exit(kind.severity().exit_code());
        }
    }
}

async fn list(file_config: Option<&FileConfig>, args: &StorageArgs) -> Result<(), IngestError> {
    let resolved = resolve_settings(file_config, &SourceArgs::default(), args)?;
    let storage = LocalStorage::new(&resolved.output_path);

    let scanned = scan_raw_prefix(&storage, &resolved.settings.raw_prefix).await?;
    tracing::info!("{} raw objects under {}", scanned.len(), resolved.settings.raw_prefix);

    for object in scanned {
        println!("{}\t{}", object.key, serde_json::to_string(&object.row)?);
    }

    Ok(())
}
