/// Configure tracing once at application startup.
///
/// Verbosity comes from `RUST_LOG` (default `info`):
/// ```bash
/// RUST_LOG=debug order_board
/// RUST_LOG=order_board::actors=debug,notifications=warn order_board
/// ```
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
