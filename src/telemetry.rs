//! Structured logging setup.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::settings::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = Registry::default().with(env_filter);

    if config.format == "json" {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    info!(level = %config.level, format = %config.format, "Telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_level_parses_as_a_filter() {
        EnvFilter::try_new(&LoggingConfig::default().level).unwrap();
    }

    #[test]
    fn invalid_filter_directives_are_errors() {
        assert!(EnvFilter::try_new("server=notalevel").is_err());
    }
}
