use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pmon_client::commands;
use pmon_client::services::ManagerAction;
use pmon_client::state::AppState;
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pmonctl")]
#[command(about = "Control projects through the pmon process monitor", long_about = None)]
struct Cli {
    /// Inventory file (default: $PMON_CLIENT_CONFIG or ~/.pmon-client/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query whether pmon runs for a project
    Status { project: String },
    /// Start a project, launching pmon if needed
    Start { project: String },
    /// Launch pmon without starting any manager
    StartPmon { project: String },
    /// Stop all managers of a project
    Stop { project: String },
    /// Stop all managers and pmon itself
    StopAll { project: String },
    /// Restart all managers of a project
    Restart { project: String },
    /// Put pmon into wait mode
    WaitMode { project: String },
    /// Configured managers
    Managers { project: String },
    /// Runtime manager states and project state
    ManagerStatus { project: String },
    /// Running status plus merged manager views
    Overview { project: String },
    /// Health score of a project
    Health { project: String },
    /// Act on a single manager
    Manager {
        project: String,
        action: ActionArg,
        index: usize,
    },
    /// Version banner of an installed runtime (newest if omitted)
    Version { version: Option<String> },
    /// Register a runnable project and add it to the inventory
    Register {
        project: String,
        /// Project directory, used when the project is not in the inventory yet
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long = "runtime")]
        version: Option<String>,
        /// Project config file (default: <dir>/config/config)
        #[arg(long = "config-file")]
        config_file: Option<PathBuf>,
    },
    /// Register a sub-project
    RegisterSub { project: String },
    /// Remove a project from pmon's registry
    Unregister { project: String },
    /// Status of every runnable project
    Refresh,
    /// Installed runtimes, newest first
    Installations,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Start,
    Stop,
    Kill,
    Remove,
}

impl From<ActionArg> for ManagerAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Start => ManagerAction::Start,
            ActionArg::Stop => ManagerAction::Stop,
            ActionArg::Kill => ManagerAction::Kill,
            ActionArg::Remove => ManagerAction::Remove,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON result only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let mut state = AppState::load(cli.config).context("Failed to load configuration")?;

    match cli.command {
        Commands::Status { project } => {
            print_json(&commands::check_status(&state, &project).await?)?
        }
        Commands::Start { project } => {
            print_json(&commands::start_project(&state, &project).await?)?
        }
        Commands::StartPmon { project } => {
            print_json(&commands::start_pmon(&state, &project).await?)?
        }
        Commands::Stop { project } => print_json(&commands::stop_project(&state, &project).await?)?,
        Commands::StopAll { project } => {
            print_json(&commands::stop_project_and_pmon(&state, &project).await?)?
        }
        Commands::Restart { project } => {
            print_json(&commands::restart_project(&state, &project).await?)?
        }
        Commands::WaitMode { project } => {
            print_json(&commands::set_wait_mode(&state, &project).await?)?
        }
        Commands::Managers { project } => {
            print_json(&commands::get_managers(&state, &project).await?)?
        }
        Commands::ManagerStatus { project } => {
            print_json(&commands::get_manager_status(&state, &project).await?)?
        }
        Commands::Overview { project } => {
            print_json(&commands::get_overview(&state, &project).await?)?
        }
        Commands::Health { project } => print_json(&commands::get_health(&state, &project).await?)?,
        Commands::Manager {
            project,
            action,
            index,
        } => print_json(
            &commands::manager_action(&state, &project, action.into(), index).await?,
        )?,
        Commands::Version { version } => {
            print_json(&commands::get_version(&state, version.as_deref()).await?)?
        }
        Commands::Register {
            project,
            dir,
            version,
            config_file,
        } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            print_json(
                &commands::register_project(&mut state, &project, dir, version, config_file)
                    .await?,
            )?
        }
        Commands::RegisterSub { project } => {
            print_json(&commands::register_sub_project(&state, &project).await?)?
        }
        Commands::Unregister { project } => {
            print_json(&commands::unregister_project(&state, &project).await?)?
        }
        Commands::Refresh => print_json(&commands::refresh_all(&state).await?)?,
        Commands::Installations => print_json(&commands::get_installations(&state))?,
    }

    Ok(())
}
