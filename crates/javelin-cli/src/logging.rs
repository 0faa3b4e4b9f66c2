//! Log configuration
//!
//! Levels and formats come from `--log-level`/`--log-format`, falling back
//! to `JAVELIN_LOG_LEVEL`/`JAVELIN_LOG_FORMAT`. `RUST_LOG` still wins when it
//! holds a valid filter. Events go to stderr so generated Java on stdout
//! stays clean.

use std::env;
use std::fmt;

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// Logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" | "verbose" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

/// Effective log configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    pub const DEFAULT: Self = Self {
        format: LogFormat::Text,
        level: LogLevel::Warn,
    };

    /// Combine command-line values with the environment. Flags win; values
    /// that fail to parse are ignored.
    #[must_use]
    pub fn resolve(level_flag: Option<&str>, format_flag: Option<&str>) -> Self {
        let env_level = env::var("JAVELIN_LOG_LEVEL").ok();
        let env_format = env::var("JAVELIN_LOG_FORMAT").ok();
        Self::resolve_with(
            level_flag.or(env_level.as_deref()),
            format_flag.or(env_format.as_deref()),
        )
    }

    fn resolve_with(level: Option<&str>, format: Option<&str>) -> Self {
        Self {
            level: level
                .and_then(LogLevel::parse)
                .unwrap_or(Self::DEFAULT.level),
            format: format
                .and_then(LogFormat::parse)
                .unwrap_or(Self::DEFAULT.format),
        }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(options: LogOptions) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::{fmt, EnvFilter};

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(options.level.to_string()));

        let builder = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        match options.format {
            LogFormat::Json => {
                let subscriber = builder.json().finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
            LogFormat::Text => {
                let subscriber = builder.compact().finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_aliases() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(LogLevel::Debug > LogLevel::Info);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("Plain"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        assert_eq!(LogOptions::resolve_with(None, None), LogOptions::DEFAULT);
        let options = LogOptions::resolve_with(Some("bogus"), Some("json"));
        assert_eq!(options.level, LogLevel::Warn);
        assert_eq!(options.format, LogFormat::Json);
    }

    #[test]
    fn test_resolve_uses_given_level() {
        let options = LogOptions::resolve_with(Some("debug"), None);
        assert_eq!(options.level, LogLevel::Debug);
        assert_eq!(options.level.as_tracing_level(), tracing::Level::DEBUG);
    }
}
