//! HomeWatch - a headless monitoring client for IoT home devices
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hwatch_app::Settings;

/// HomeWatch - a headless monitoring client for IoT home devices
#[derive(Parser, Debug)]
#[command(name = "hwatch")]
#[command(about = "A headless monitoring client for IoT home devices", long_about = None)]
struct Args {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit notifications as JSON lines (for scripting)
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the account's real-time channels (the default)
    Run,
    /// Authenticate and persist a session
    Login { email: String, password: String },
    /// Clear the persisted session and disconnect
    Logout,
    /// Show configuration diagnostics and session state
    Status,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    hwatch_core::logging::init()?;

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => homewatch::run_monitor(settings, args.headless).await?,
        Command::Login { email, password } => {
            homewatch::run_login(&settings, &email, &password).await?
        }
        Command::Logout => homewatch::run_logout(&settings)?,
        Command::Status => homewatch::run_status(&settings)?,
    }

    Ok(())
}
