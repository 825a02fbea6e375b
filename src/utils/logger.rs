// Logger initialization

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "creator_graph=info";

/// Install the global subscriber. Logs go to stderr, and also to a daily
/// rolling file when a log directory is configured. Keep the returned guard
/// alive for the life of the process so buffered file output is flushed.
pub fn init_logger(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "creator-graph.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
