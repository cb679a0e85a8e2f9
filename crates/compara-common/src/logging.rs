//! Logging configuration and initialization
//!
//! All compara binaries configure `tracing` exactly once at startup through
//! [`init_logging`]. Library code only emits events with the `tracing`
//! macros and never installs a subscriber of its own.
//!
//! Console output goes to stderr so that command results written to stdout
//! (for example `--format json` summaries) stay machine readable.
//!
//! The returned [`LoggingGuard`] owns the background writer of the log file.
//! Keep it alive until the end of `main`; dropping it flushes pending lines.
//!
//! ```no_run
//! use compara_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder().level(LogLevel::Debug).build();
//!     let _guard = init_logging(&config)?;
//!     tracing::info!(records = 12, "Scan complete");
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

pub const ENV_LEVEL: &str = "LOG_LEVEL";
pub const ENV_OUTPUT: &str = "LOG_OUTPUT";
pub const ENV_FORMAT: &str = "LOG_FORMAT";
pub const ENV_DIR: &str = "LOG_DIR";
pub const ENV_FILE_PREFIX: &str = "LOG_FILE_PREFIX";
pub const ENV_FILTER: &str = "LOG_FILTER";
pub const ENV_INCLUDE_LOCATION: &str = "LOG_INCLUDE_LOCATION";
pub const ENV_INCLUDE_THREAD_IDS: &str = "LOG_INCLUDE_THREAD_IDS";
pub const ENV_INCLUDE_TARGETS: &str = "LOG_INCLUDE_TARGETS";

/// Look a lowercase name up in a table of accepted spellings
fn choose<T: Copy>(kind: &str, value: &str, choices: &[(&str, T)]) -> Result<T> {
    let wanted = value.trim().to_lowercase();
    match choices.iter().find(|(name, _)| *name == wanted) {
        Some((_, choice)) => Ok(*choice),
        None => bail!("Invalid log {}: {}", kind, value),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const NAMES: [(&'static str, LogLevel); 6] = [
        ("trace", LogLevel::Trace),
        ("debug", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("warning", LogLevel::Warn),
        ("error", LogLevel::Error),
    ];

    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        choose("level", s, &Self::NAMES)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter().to_string().to_lowercase())
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr only
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        self != LogOutput::File
    }

    fn file(self) -> bool {
        self != LogOutput::Console
    }
}

impl FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        choose(
            "output",
            s,
            &[
                ("console", LogOutput::Console),
                ("stderr", LogOutput::Console),
                ("file", LogOutput::File),
                ("both", LogOutput::Both),
                ("all", LogOutput::Both),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        choose(
            "format",
            s,
            &[("text", LogFormat::Text), ("pretty", LogFormat::Text), ("json", LogFormat::Json)],
        )
    }
}

/// Extra fields printed on every line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDecorations {
    pub location: bool,
    pub thread_ids: bool,
    pub targets: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Directory of the daily rolling log file
    pub log_dir: PathBuf,
    /// File name prefix ("compara" -> "compara.2026-10-19")
    pub log_file_prefix: String,
    /// Extra directives such as "compara_ingest::newick=trace"
    pub filter_directives: Option<String>,
    #[serde(default)]
    pub decorations: LineDecorations,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "compara".to_string(),
            filter_directives: None,
            decorations: LineDecorations::default(),
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Apply the `LOG_*` environment variables on top of `self`
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(level) = var(ENV_LEVEL) {
            self.level = level.parse()?;
        }
        if let Some(output) = var(ENV_OUTPUT) {
            self.output = output.parse()?;
        }
        if let Some(format) = var(ENV_FORMAT) {
            self.format = format.parse()?;
        }
        if let Some(dir) = var(ENV_DIR) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = var(ENV_FILE_PREFIX) {
            self.log_file_prefix = prefix;
        }
        if let Some(filter) = var(ENV_FILTER) {
            self.filter_directives = Some(filter);
        }

        let flag = |key: &str, current: bool| var(key).map_or(current, |v| v.trim().parse().unwrap_or(false));
        self.decorations = LineDecorations {
            location: flag(ENV_INCLUDE_LOCATION, self.decorations.location),
            thread_ids: flag(ENV_INCLUDE_THREAD_IDS, self.decorations.thread_ids),
            targets: flag(ENV_INCLUDE_TARGETS, self.decorations.targets),
        };

        Ok(self)
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let base = EnvFilter::builder()
            .with_default_directive(self.level.as_filter().into())
            .from_env_lossy();

        self.filter_directives
            .iter()
            .flat_map(|d| d.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .try_fold(base, |filter, directive| {
                let parsed = directive
                    .parse()
                    .with_context(|| format!("Failed to parse filter directive '{}'", directive))?;
                Ok(filter.add_directive(parsed))
            })
    }
}

#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Keeps the non-blocking file writer alive; flushes on drop
#[must_use = "dropping the guard stops the log file writer"]
pub struct LoggingGuard {
    file: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let LineDecorations {
        location,
        thread_ids,
        targets,
    } = config.decorations;

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(targets)
        .with_thread_ids(thread_ids)
        .with_file(location)
        .with_line_number(location);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Install the global tracing subscriber
///
/// Call once per process; a second call fails.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let filter = config.env_filter()?;
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut file = None;

    if config.output.console() {
        layers.push(fmt_layer(config, std::io::stderr, true));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(config, writer, false));
        file = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { file })
}
