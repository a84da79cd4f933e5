use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "tubely=debug,tower_http=debug";

/// Whether `LOG_FORMAT` asks for JSON lines
fn json_requested(log_format: Option<&str>) -> bool {
    log_format
        .map(|f| f.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialize tracing: compact console output by default, JSON when `LOG_FORMAT=json`.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let log_format = std::env::var("LOG_FORMAT").ok();

    if json_requested(log_format.as_deref()) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .try_init()?;
    }

    tracing::info!(json = json_requested(log_format.as_deref()), "Tracing initialized");
    Ok(())
}
