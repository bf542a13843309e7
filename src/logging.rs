use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns false when a subscriber was
/// already installed (second call from the same process, or a host that set
/// its own).
pub fn init_tracing(default_filter: &str) -> bool {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init()
        .is_ok()
}
