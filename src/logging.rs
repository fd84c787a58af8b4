use env_logger::Builder;

/// Initialize the console log target. RUST_LOG wins; otherwise the config's
/// `log_level` filter applies; otherwise info.
pub fn init(config_filter: Option<&str>) {
    let mut builder = Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(env_filter) => {
            builder.parse_filters(&env_filter);
        }
        Err(_) => {
            builder.parse_filters(config_filter.unwrap_or("info"));
        }
    }
    builder.format_timestamp_secs();
    // ignore double-init so tests can call this freely
    let _ = builder.try_init();
}
