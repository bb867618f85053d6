//! Tracing subscriber setup used by the binary.

use std::env;

use tracing_subscriber::{EnvFilter, fmt};

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }

    tracing::info!("logger initialized");
}
