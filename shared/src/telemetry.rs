use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber for desktop shells and tooling.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g.
/// `erp_shared=info`) is used. Calling this again after a subscriber is in
/// place is a no-op, so tests and embedding shells can call it freely.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
