mod cli;
mod config;
mod profile;
mod session;
mod storage;
mod tasks;
mod tui;
mod view;

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use opentodo_core::{storage::SlotStore, theme::load_theme};
use session::Session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the profile store and the TUI.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command.unwrap_or(Command::Tui) {
        Command::Version => print_version(),
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        command => {
            let session = Session::open(storage::open_profile_store(&config).await?).await;
            dispatch(command, &session, &config).await?
        }
    }

    Ok(())
}

async fn dispatch<S: SlotStore>(
    command: Command,
    session: &Session<S>,
    config: &config::Config,
) -> Result<()> {
    match command {
        Command::Tui => {
            let theme = load_theme(session.store.slots()).await;
            let profile = session.store.profile().await;
            tui::launch(&profile, &session.locale, theme)
        }
        Command::Profile(cmd) => {
            profile::handle_profile(cmd, session, config.export_dir.as_deref()).await
        }
        Command::Project(cmd) => tasks::handle_project(cmd, session).await,
        Command::List(cmd) => tasks::handle_list(cmd, session).await,
        Command::Group(cmd) => tasks::handle_group(cmd, session).await,
        Command::Task(cmd) => tasks::handle_task(cmd, session).await,
        Command::Background(cmd) => profile::handle_background(cmd, session).await,
        Command::Settings(cmd) => profile::handle_settings(cmd, session).await,
        Command::Version | Command::Health | Command::Config(_) => Ok(()),
    }
}

fn init_tracing() {
    // Respect user-provided filters; default to warn so command output stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("opentodo {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick write/read/delete check against the slot directory.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: SlotStore>(store: &S) -> Result<()> {
    let check_key = "health-check";
    let payload = b"ok";
    store.put(check_key, payload).await?;
    let round_trip = store.get(check_key).await?;
    store.delete(check_key).await?;

    if round_trip.as_deref() != Some(payload.as_slice()) {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
