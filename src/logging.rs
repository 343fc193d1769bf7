use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so that stdout carries only the rendered equations.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn pass_span(model: &str) -> Span {
    tracing::info_span!("pass", model)
}
