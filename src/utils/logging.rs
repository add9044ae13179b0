use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configured level for the bridge, with the MQTT client held at `warn`
fn directives(log_level: &str) -> String {
    format!("{},rumqttc=warn", log_level.trim())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level; an unparsable level falls back to `info`.
pub fn init_tracing(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(log_level)))
        .or_else(|_| EnvFilter::try_new(directives("info")))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()?;

    Ok(())
}
