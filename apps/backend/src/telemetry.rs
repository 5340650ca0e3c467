use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the process-wide JSON subscriber.
///
/// `RUST_LOG` overrides the default filter, which keeps this crate
/// verbose and the database stack quiet.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,backend=debug,sqlx=warn,sea_orm=warn"));

    let json_layer = fmt::layer()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .init();
}
