use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Encoding of log lines on stderr.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Minimum level of log lines on stderr, from quietest to noisiest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    /// No log output, for scripts that parse stderr.
    Off,
    Error,
    /// Includes index records skipped under the lenient index policy.
    Warn,
    Info,
    /// Per-window offsets and statistics.
    Debug,
    /// Every frame header and every recovered ID gap.
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Module targets are only worth printing once the scan crates start logging.
    fn shows_target(self) -> bool {
        self >= LogLevel::Debug
    }
}

/// Send logs to stderr; stdout carries decoded output only.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(level.shows_target());

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_verbosity() {
        let levels = LogLevel::value_variants();
        assert_eq!(levels.first(), Some(&LogLevel::Off));
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(LogLevel::Off.as_filter(), LevelFilter::OFF);
        assert_eq!(LogLevel::Warn.as_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Trace.as_filter(), LevelFilter::TRACE);
    }

    #[test]
    fn targets_shown_from_debug() {
        assert!(!LogLevel::Warn.shows_target());
        assert!(!LogLevel::Info.shows_target());
        assert!(LogLevel::Debug.shows_target());
        assert!(LogLevel::Trace.shows_target());
    }
}
