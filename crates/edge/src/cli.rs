use std::io::BufRead;
use std::sync::Arc;

use actors::{WindowActorDeps, WindowActorHandle};
use chrono::Utc;
use clap::{Parser, Subcommand};
use domain::{HealthSignal, WindowActorConfig};
use tracing::{error, info};

use crate::listener::LoggingListener;
use crate::Result;

/// winengine — drives a health-signal windowing engine from stdin, purely
/// to exercise it end-to-end. No engine logic lives here: this crate only
/// wires a `WindowActorHandle` to a logging bus/listener pair.
#[derive(Debug, Parser)]
#[command(name = "winengine", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read signal names (one per line) from stdin until EOF, feeding each
    /// into the windowing engine, then print a final snapshot.
    Run(RunCmd),
}

#[derive(Debug, Parser)]
pub struct RunCmd {
    /// Optional TOML settings file overlaying `WindowActorConfig::default()`.
    #[arg(long, value_name = "FILE")]
    settings: Option<String>,

    /// Pattern name the default threshold matcher tags side-effect signals
    /// with.
    #[arg(long, default_value = "cpu")]
    pattern: String,

    /// Signal count at which the default threshold matcher fires.
    #[arg(long, default_value_t = 3)]
    threshold: usize,
}

#[tracing::instrument(skip_all)]
pub fn start() -> std::process::ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(run) => run_blocking(run),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("winengine failed: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run_blocking(cmd: RunCmd) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(run(cmd))
}

#[tracing::instrument(skip_all)]
async fn run(cmd: RunCmd) -> Result<()> {
    let config = load_config(cmd.settings.as_deref())?;
    let deps = WindowActorDeps::defaults(&config, cmd.pattern, cmd.threshold);
    let listener = Arc::new(LoggingListener);

    let handle = WindowActorHandle::start(config, deps, listener).await?;

    info!("reading signal names from stdin, one per line (Ctrl-D to finish)");
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        handle.submit(HealthSignal::new(name.to_string(), Utc::now(), "stdin"))?;
    }

    let snapshot = handle.snapshot().await?;
    match snapshot {
        Some(snapshot) => info!(count = snapshot.data.len(), "final snapshot"),
        None => info!("final snapshot: no window currently open"),
    }

    handle.stop();
    Ok(())
}

#[tracing::instrument(skip_all)]
fn load_config(settings_path: Option<&str>) -> Result<WindowActorConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = settings_path {
        builder = builder.add_source(config::File::from(std::path::Path::new(path)).required(true));
    }
    builder = builder.add_source(config::Environment::with_prefix("WINENGINE").separator("__"));

    let loaded = builder.build()?;
    Ok(loaded.try_deserialize::<WindowActorConfig>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_config_without_a_settings_file_falls_back_to_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.frequency, WindowActorConfig::default().frequency);
    }

    #[test]
    fn load_config_overlays_a_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "tick_interval = {{ secs = 5, nanos = 0 }}").unwrap();

        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.tick_interval, std::time::Duration::from_secs(5));
    }
}
