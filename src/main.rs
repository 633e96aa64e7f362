use clap::{Parser, Subcommand};
use lora_messenger::config::{Config, ConfigLoader};
use lora_messenger::error::AppResult;
use lora_messenger::logging::{self, LogTarget};
use lora_messenger::messenger::Messenger;
use lora_messenger::port::{list_port_details, SystemPortOpener};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Chat over a LoRa radio attached to a serial port.",
    long_about = "Sends lines of the form '<username>: <message>' to a LoRa radio over a serial link and shows what the radio receives."
)]
struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive, e.g. `debug` or `lora_messenger=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default).
    Tui {
        /// Prefill the username field.
        #[arg(long)]
        username: Option<String>,
        /// Open this port at start-up.
        #[arg(long)]
        port: Option<String>,
    },
    /// List serial ports.
    List {
        /// Print port details as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Line mode: stdin lines are sent, chat entries are printed to stdout.
    Headless {
        /// Port to open.
        #[arg(long)]
        port: String,
        /// Name to send messages as.
        #[arg(long)]
        username: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    }
    .into_config();

    let command = cli.command.unwrap_or(Command::Tui {
        username: None,
        port: None,
    });

    let target = match command {
        Command::Tui { .. } => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    if let Some(path) = logging::init(&config.logging, target, cli.log_level.as_deref())? {
        if target == LogTarget::File {
            eprintln!("Logging to {}", path.display());
        }
    }

    match command {
        Command::List { json } => list(json),
        Command::Headless { port, username } => headless(&config, &port, username),
        Command::Tui { username, port } => tui(&config, username, port),
    }
}

fn build_messenger(config: &Config) -> AppResult<Messenger> {
    Ok(Messenger::new(
        Arc::new(SystemPortOpener),
        config.serial.session_settings(),
    )?)
}

fn list(json: bool) -> AppResult<()> {
    let ports = list_port_details();
    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
    } else if ports.is_empty() {
        println!("No serial ports found");
    } else {
        for port in ports {
            println!("{}\t{}", port.port_name, port.port_type);
        }
    }
    Ok(())
}

fn headless(config: &Config, port: &str, username: String) -> AppResult<()> {
    let mut messenger = build_messenger(config)?;
    messenger.refresh_ports();
    messenger.username = username;
    lora_messenger::headless::open_port(&mut messenger, port);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(lora_messenger::headless::run(
        &mut messenger,
        config.serial.poll_interval(),
    ));
    messenger.shutdown();
    info!("Application closed");
    Ok(result?)
}

#[cfg(feature = "tui")]
fn tui(config: &Config, username: Option<String>, port: Option<String>) -> AppResult<()> {
    use lora_messenger::tui::App;

    let mut messenger = build_messenger(config)?;
    messenger.refresh_ports();
    if let Some(name) = username.or_else(|| config.chat.username.clone()) {
        messenger.username = name;
    }

    let opened = port.map(|name| messenger.connect_to(&name));

    let mut app = App::with_config(messenger, config);
    app.status_message = match opened {
        Some(Ok(info)) => Some(format!(
            "Connected to {} at {} baud",
            info.port_name, info.baud_rate
        )),
        Some(Err(e)) => Some(format!("Error connecting to COM port: {e}")),
        None => None,
    };
    app.run()?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn tui(_config: &Config, _username: Option<String>, _port: Option<String>) -> AppResult<()> {
    tracing::warn!("Built without the `tui` feature");
    eprintln!("This build has no terminal UI; use `lora-messenger headless` or `list`.");
    Ok(())
}
