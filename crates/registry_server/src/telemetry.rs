/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init(binary: &str) {
    let default_filter = format!("info,registry_core=debug,registry_server=debug,{binary}=debug");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
