// tracing subscriber setup shared by both front ends.

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &AppConfig) -> String {
    match &config.log_filter {
        Some(filter) => filter.clone(),
        None if config.debug => "debug".to_string(),
        None => "info".to_string(),
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = AppConfig {
            debug: true,
            log_filter: Some("warn".into()),
            ..AppConfig::default()
        };
        assert_eq!(default_filter(&config), "warn");
    }

    #[test]
    fn debug_mode_lowers_level() {
        let config = AppConfig {
            debug: true,
            ..AppConfig::default()
        };
        assert_eq!(default_filter(&config), "debug");
        assert_eq!(default_filter(&AppConfig::default()), "info");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(&AppConfig::default());
        init(&AppConfig::default());
    }
}
