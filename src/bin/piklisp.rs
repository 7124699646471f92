//! Piklisp CLI binary.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Controlled via RUST_LOG, e.g. RUST_LOG=piklisp=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("piklisp=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    piklisp::cli::run()
}
