use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Filter comes from `STOCKGPT_LOG` (EnvFilter syntax). When
/// `STOCKGPT_LOG_FILE` is set, logs are appended to that file instead of
/// stderr so they don't interleave with an interactive front-end.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("STOCKGPT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    let file = std::env::var("STOCKGPT_LOG_FILE").ok().and_then(|log_path| {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_path, e);
                None
            }
        }
    });

    let result = if let Some(file) = file {
        let file_layer = fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true);
        registry.with(file_layer).try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    // A host app (or a test) may already have installed a subscriber.
    if let Err(e) = result {
        tracing::debug!("tracing already initialized: {}", e);
    }
}
