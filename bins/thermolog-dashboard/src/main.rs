//! Thermolog dashboard CLI
//!
//! Terminal front end for the thermolog device: a live dashboard session and
//! a one-shot Wi-Fi provisioning command.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thermolog_client::{
    DashboardController, DashboardEvent, ProvisioningClient, ReqwestHttpClient,
};
use thermolog_core::{load_config, Config};

use crate::console::{parse_line, render_options, render_status, ConsoleCommand, StdoutNotifier};

#[derive(Parser)]
#[command(name = "thermolog-dashboard")]
#[command(about = "Dashboard and provisioning tool for the thermolog device")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device host (overrides config file)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Device port (overrides config file)
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the device's temperature log and issue commands from stdin
    Dashboard,

    /// Send Wi-Fi credentials to a device in access-point mode
    Provision {
        #[arg(long)]
        ssid: String,

        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,thermolog_client=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(path) = &cli.config {
        tracing::debug!("Loading configuration from {:?}", path);
        load_config(path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };
    if let Some(host) = cli.host {
        config.device.host = host;
    }
    if let Some(port) = cli.port {
        config.device.port = port;
    }

    match cli.command {
        Command::Dashboard => run_dashboard(config).await,
        Command::Provision { ssid, password } => {
            let client = ProvisioningClient::new(
                &config.device,
                config.dashboard.body_encoding,
                Arc::new(ReqwestHttpClient::default()),
            );
            let message = client.submit_credentials(&ssid, &password).await;
            println!("{} [{}]", message, message.color());
            if message.is_success() {
                Ok(())
            } else {
                anyhow::bail!("provisioning failed")
            }
        }
    }
}

async fn run_dashboard(config: Config) -> anyhow::Result<()> {
    tracing::info!("Connecting to device at {}", config.device.authority());

    let controller = Arc::new(DashboardController::new(
        &config.device,
        config.dashboard,
        Arc::new(ReqwestHttpClient::default()),
        Arc::new(StdoutNotifier),
    ));

    let mut events = controller.subscribe();
    let startup = controller.initialize().await?;
    if let Some(e) = &startup.batch_error {
        println!("Could not load history: {}", e);
    }
    println!("{}", render_status(&controller.snapshot().await));

    let renderer = {
        let controller = controller.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(DashboardEvent::Redraw) => {
                        println!("{}", render_status(&controller.snapshot().await));
                    }
                    Ok(DashboardEvent::Reloaded { readings }) => {
                        println!("Reloaded {} readings", readings);
                    }
                    Ok(DashboardEvent::ChannelClosed) => {
                        println!("Live updates stopped");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Renderer skipped {} events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    };

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == ConsoleCommand::Quit {
            break;
        }
        if let Err(e) = execute(&controller, command).await {
            tracing::error!("Command failed: {}", e);
            println!("Error: {}", e);
        }
    }

    startup.channel.close();
    renderer.abort();
    tracing::info!("Dashboard closed");
    Ok(())
}

async fn execute(controller: &DashboardController, command: ConsoleCommand) -> anyhow::Result<()> {
    match command {
        ConsoleCommand::Add(row) => {
            controller.add_row(&row).await?;
        }
        ConsoleCommand::Select(timestamp) => {
            if !controller.select(&timestamp).await {
                println!("No row with timestamp {}", timestamp);
            }
        }
        ConsoleCommand::Delete => {
            if controller.delete_selected().await?.is_none() {
                println!("Nothing to delete");
            }
        }
        ConsoleCommand::Clear => controller.clear_csv().await?,
        ConsoleCommand::ClearWifi => controller.clear_wifi().await?,
        ConsoleCommand::Download(path) => {
            let bytes = controller.download_csv(&path).await?;
            println!("Saved {} bytes to {}", bytes, path.display());
        }
        ConsoleCommand::List => {
            println!("{}", render_options(&controller.snapshot().await));
        }
        ConsoleCommand::Help => println!("{}", console::HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
