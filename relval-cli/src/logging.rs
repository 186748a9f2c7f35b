use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str =
    "relval=info,relval_core=info,relval_io=info,relval_store=info,relval_attribution=info";

///
/// Send `tracing` events to stderr, filtered by `RUST_LOG`.
///
/// Stdout stays free for command output.
///
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
