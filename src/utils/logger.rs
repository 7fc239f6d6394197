//! Subscriber setup for the two hosts. `RUST_LOG`, when set, replaces the
//! default directives.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "fx_ingest=info,warn";
const VERBOSE_DIRECTIVES: &str = "fx_ingest=debug,info";

fn directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    }
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Compact human-readable lines on stderr. Stdout carries only the
/// invocation's JSON body and `ls` rows.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(directives(verbose)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// One JSON object per event with its fields at the top level.
pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_DIRECTIVES))
        .with(
            fmt::layer()
                .with_target(false)
                .without_time() // CloudWatch stamps every line itself
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .init();
}
