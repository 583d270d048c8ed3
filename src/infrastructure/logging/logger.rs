use super::config::{LogConfig, LogFormat, RotationPolicy};
use super::retention::spawn_periodic_cleanup;
use anyhow::Result;
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub(super) const LOG_FILE_NAME: &str = "habit-rhythm.log";
const RETENTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
    retention: Option<JoinHandle<()>>,
}

impl LoggerImpl {
    /// Install the global subscriber.
    ///
    /// The returned value owns the file writer guard; dropping it flushes
    /// and stops file output. With file output inside a tokio runtime, old
    /// log files are also pruned hourly per `retention_days` until drop.
    ///
    /// # Errors
    /// Returns an error for an unknown level or when a global subscriber
    /// is already installed.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let (layers, guard) = build_layers(config)?;
        tracing_subscriber::registry().with(layers).try_init()?;

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        let retention = config
            .log_dir
            .clone()
            .and_then(|dir| spawn_periodic_cleanup(dir, config.retention_days, RETENTION_INTERVAL));

        Ok(Self {
            _guard: guard,
            retention,
        })
    }

    pub fn retention_scheduled(&self) -> bool {
        self.retention.is_some()
    }
}

impl Drop for LoggerImpl {
    fn drop(&mut self) {
        if let Some(task) = self.retention.take() {
            task.abort();
        }
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn build_layers(config: &LogConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
    let level = parse_log_level(&config.level)?;
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        let appender = match config.rotation {
            RotationPolicy::Daily => rolling::daily(log_dir, LOG_FILE_NAME),
            RotationPolicy::Hourly => rolling::hourly(log_dir, LOG_FILE_NAME),
            RotationPolicy::Never => rolling::never(log_dir, LOG_FILE_NAME),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);

        // Files are always JSON
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter(level))
                .boxed(),
        );
    }

    if config.enable_stdout || config.log_dir.is_none() {
        let stdout_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stdout)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_filter(env_filter(level))
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stdout)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter(level))
                .boxed(),
        };
        layers.push(stdout_layer);
    }

    Ok((layers, guard))
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_file_output_builds_two_layers() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::default().with_log_dir(dir.path());
        let (layers, guard) = build_layers(&config).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(guard.is_some());
    }

    #[test]
    fn test_stdout_is_forced_without_file_output() {
        let config = LogConfig {
            enable_stdout: false,
            format: LogFormat::Pretty,
            ..LogConfig::default()
        };
        let (layers, guard) = build_layers(&config).unwrap();
        assert_eq!(layers.len(), 1);
        assert!(guard.is_none());
    }

    // Installs the global subscriber, so only one test may call init
    #[test]
    fn test_logger_init_stdout_only() {
        let config = LogConfig {
            format: LogFormat::Pretty,
            rotation: RotationPolicy::Never,
            ..LogConfig::default()
        };
        let logger = LoggerImpl::init(&config).unwrap();
        // No file output, nothing to prune
        assert!(!logger.retention_scheduled());
    }
}
