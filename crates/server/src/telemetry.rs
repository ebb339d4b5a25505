//! Structured logging (C13): `tracing` + `tracing-subscriber` with an
//! `EnvFilter` driven by the config's `log_level`, falling back to
//! `RUST_LOG` when set.

pub fn init(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
