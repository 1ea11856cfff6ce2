mod error;
mod listener;

pub mod cli;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_file(true).with_line_number(true))
        .init();

    info!("logging setup complete");
    cli::start()
}
