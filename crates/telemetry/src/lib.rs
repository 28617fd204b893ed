//! Tracing subscriber bootstrap.

use library_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the level filter: `RUST_LOG` wins over the configured level.
fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level).map_err(|err| {
            anyhow::anyhow!("invalid log level '{}': {err}", settings.log_level)
        }),
    }
}

/// Install the global subscriber, writing to stderr. Returns `Ok(false)`
/// when one was already installed, which happens in tests and when the CLI
/// re-enters bootstrap.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<bool> {
    let filter = env_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .is_ok(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(
            target: "library-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }
    Ok(installed)
}
