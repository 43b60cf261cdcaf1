use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize tracing for the bot.
///
/// Default: info for our crates and dependencies.
/// Can be overridden with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,{service_name}=info,pcasm_core=info,pcasm_market=info,pcasm_telegram=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install log subscriber: {e}")))?;

    Ok(())
}
