use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "vertigo_engine=debug,wgpu=warn") and takes precedence over `RUST_LOG`.
/// With neither set, `default_level` applies to every target.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match filter_spec(&config, std::env::var("RUST_LOG").ok()) {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(config.default_level),
        };
        builder.write_style(config.write_style);

        if let Err(e) = builder.try_init() {
            // Another logger won; keep it.
            eprintln!("logger already installed: {e}");
            return;
        }
        log::debug!("logging initialized");
    });
}

/// Filter string to parse, if any: the configured one, else the environment's.
fn filter_spec(config: &LoggingConfig, env: Option<String>) -> Option<String> {
    config
        .env_filter
        .clone()
        .or(env)
        .filter(|f| !f.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_beats_environment() {
        let config = LoggingConfig {
            env_filter: Some("vertigo_engine=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(
            filter_spec(&config, Some("warn".into())).as_deref(),
            Some("vertigo_engine=trace")
        );
    }

    #[test]
    fn environment_is_used_when_unconfigured() {
        let config = LoggingConfig::default();
        assert_eq!(filter_spec(&config, Some("debug".into())).as_deref(), Some("debug"));
        assert_eq!(filter_spec(&config, Some("  ".into())), None);
        assert_eq!(filter_spec(&config, None), None);
    }
}
