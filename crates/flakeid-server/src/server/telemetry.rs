//! # Telemetry
//!
//! Console logging via `tracing` + `tracing-subscriber`.
//!
//! - The filter comes from `RUST_LOG` and defaults to `info`.
//! - Enabling `flakeid=trace` shows the per-call generation spans emitted by
//!   the library's `tracing` feature.
//!
//! ```bash
//! RUST_LOG=info,flakeid=trace cargo run -p flakeid-server
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(())
}
