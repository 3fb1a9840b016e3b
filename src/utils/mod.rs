use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

/// Installs a stderr `fmt` subscriber. `RUST_LOG` wins over `directive`;
/// an unparsable directive falls back to `warn`.
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match directive.parse::<Directive>() {
            Ok(directive) => EnvFilter::default().add_directive(directive),
            Err(_) => EnvFilter::new("warn"),
        }
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
