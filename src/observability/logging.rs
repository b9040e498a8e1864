//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber
//! - Pick the log level from the environment or config
//!
//! # Design Decisions
//! - Level precedence: `RUST_LOG`, then `MOJO_LOG_LEVEL`, then config
//! - `fatal` is accepted and treated as `error`
//! - Initializing twice is harmless (the second call is ignored)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Environment variable overriding the configured log level.
pub const LOG_LEVEL_ENV: &str = "MOJO_LOG_LEVEL";

/// Map a framework log level to a `tracing` filter level.
pub fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "fatal" => "error".to_string(),
        "" => "debug".to_string(),
        other => other.to_string(),
    }
}

/// The level to use when `RUST_LOG` is not set.
pub fn resolve_level(env_level: Option<&str>, config_level: &str) -> String {
    match env_level {
        Some(level) if !level.trim().is_empty() => normalize_level(level),
        _ => normalize_level(config_level),
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let env_level = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(resolve_level(env_level.as_deref(), &config.log_level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.log_format == "compact" {
        registry.with(fmt::layer().compact()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
