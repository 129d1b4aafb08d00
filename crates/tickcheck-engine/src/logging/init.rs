use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// The harness reports everything a run produces through `log`: test
/// registrations, start and rejection notices, and the `success / total`
/// summary at `info`; attributed check failures at `warn`; per-frame budget
/// accounting at `debug`.
///
/// `env_filter` uses `env_logger` syntax (e.g. "tickcheck=debug") and wins
/// over `RUST_LOG`. With neither set, `default_level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the `log` backend, once per process.
///
/// Call before registering tests so registration lines are not lost. If the
/// host already installed a logger, that logger is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            log::debug!("a logger is already installed; keeping it");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_defers_to_rust_log_then_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.env_filter, None);
        assert_eq!(config.default_level, LevelFilter::Info);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig { default_level: LevelFilter::Trace, ..LoggingConfig::default() });
        log::info!("still logging");
    }
}
