use clap::Parser;
use sensor_logger::{Acquisition, ConfigLoader};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Polls a laboratory sensor over a serial line and logs readings to PostgreSQL with a CSV backup."
)]
struct Args {
    /// Path to the configuration file (default: standard resolution order).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port override (e.g. /dev/ttyUSB0, COM3).
    #[arg(short, long)]
    port: Option<String>,

    /// Polling command override.
    #[arg(long)]
    command: Option<String>,

    /// List detected serial ports and exit.
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.list_ports {
        for port in serialport::available_ports()? {
            println!("{}", port.port_name);
        }
        return Ok(());
    }

    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(command) = args.command {
        config.device.command = command;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let run = config.run_configuration()?;
    let acquisition = Acquisition::new();
    let target = acquisition.start(&run).await?;
    info!(%target, port = %run.serial.port, "logging started, press Ctrl+C to stop");

    tokio::select! {
        _ = shutdown_signal() => {
            info!("signal received, stopping acquisition");
        }
        _ = run_ended(&acquisition) => {
            warn!("acquisition ended on its own (channel fault)");
        }
    }

    acquisition.stop().await;
    info!("shut down cleanly");
    Ok(())
}

/// Resolves when the worker exits without a stop request.
async fn run_ended(acquisition: &Acquisition) {
    while acquisition.is_running() {
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
