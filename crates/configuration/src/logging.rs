use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the global tracing subscriber.
///
/// Output goes to stderr, and additionally to a daily rolling file when a log
/// directory is configured. The returned guard must be kept alive for the file
/// writer to flush.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "bookkeeper.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            builder
                .with_writer(std::io::stderr.and(file_writer))
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            tracing::info!(level = %settings.level, directory = %directory.display(), "Logging to stderr and a daily file.");
            Ok(Some(guard))
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            tracing::debug!(level = %settings.level, "Logging to stderr.");
            Ok(None)
        }
    }
}
