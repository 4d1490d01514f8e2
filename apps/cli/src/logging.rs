//! Logging initialization
//!
//! Diagnostics go to stderr so they never interleave with results on
//! stdout. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `json` selects structured output (one JSON object per event); otherwise
/// the human-readable formatter is used.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let env_filter = build_env_filter(level);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    }

    Ok(())
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tally={level},tally_calc={level},tally_units={level}")))
}
