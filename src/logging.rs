use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr so stdout stays clean for tree output. `RUST_LOG` overrides the default `warn`
/// level, e.g. `RUST_LOG=jsontree=trace` to see every token.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
