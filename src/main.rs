//! tmuxspace - declarative tmux session layouts
//!
//! Run with `tmuxspace --help` for usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tmuxspace::{
    APP_NAME, VERSION,
    config::{Config, FileProjectStore, ProjectStore},
    project::ProjectManager,
    tmux::TmuxExecutor,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Manage tmux session layouts as reusable projects")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file
    NewProject {
        /// Project name
        name: String,

        /// Directory the session starts in
        start_directory: PathBuf,

        /// Replace an existing project file
        #[arg(short, long)]
        force: bool,
    },

    /// Create a new project and start its session
    NewSession {
        /// Project and session name
        name: String,

        /// Directory the session starts in (default: current directory)
        path: Option<PathBuf>,
    },

    /// Start the session of an existing project
    Open {
        /// Project name
        name: String,
    },

    /// Attach to a running session
    Attach {
        /// Session name
        name: String,
    },

    /// Switch the current tmux client to a session
    Switch {
        /// Session name
        name: String,
    },

    /// List stored projects
    List,

    /// Delete a project file
    Delete {
        /// Project name
        name: String,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from(path)?),
        None => Ok(Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config, using defaults: {}", e);
            Config::default()
        })),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    setup_logging(cli.debug || config.debug, config.log_file.as_deref())?;
    debug!("{} v{}", APP_NAME, VERSION);

    match cli.command {
        Commands::NewProject {
            name,
            start_directory,
            force,
        } => {
            let store =
                FileProjectStore::from_config(&config)?.with_overwrite(config.overwrite_existing || force);
            let manager = ProjectManager::new(store, TmuxExecutor::from_config(&config));

            let project = manager.create_project(&name, start_directory)?;
            println!(
                "Project '{}' saved to {:?}",
                project.name,
                manager.store().project_path(&project.name)
            );
        }

        Commands::NewSession { name, path } => {
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };

            let manager = ProjectManager::from_config(&config)?;
            manager.mux().check_installed().await?;

            let project = manager.new_session(&name, path).await?;
            info!("Started session '{}'", project.name);
            println!("Session '{}' created", project.name);
            println!("Attach with: {} attach {}", APP_NAME, project.name);
        }

        Commands::Open { name } => {
            let manager = ProjectManager::from_config(&config)?;
            manager.mux().check_installed().await?;

            let project = manager.open_session(&name).await?;
            println!(
                "Session '{}' ready with {} windows",
                project.name,
                project.windows.len()
            );
        }

        Commands::Attach { name } => {
            let manager = ProjectManager::from_config(&config)?;
            manager.attach_session(&name).await?;
        }

        Commands::Switch { name } => {
            let manager = ProjectManager::from_config(&config)?;
            manager.switch_session(&name).await?;
        }

        Commands::List => {
            let store = FileProjectStore::from_config(&config)?;
            let names = store.list()?;

            if names.is_empty() {
                println!("No projects in {:?}.", store.dir());
                println!("Use '{} new-project <name> <dir>' to add one.", APP_NAME);
                return Ok(());
            }

            for name in names {
                println!("{}", name);
            }
        }

        Commands::Delete { name } => {
            let store = FileProjectStore::from_config(&config)?;
            store.remove(&name)?;
            println!("Project '{}' deleted", name);
        }

        Commands::Config { init } => {
            let config_path = match cli.config {
                Some(path) => path,
                None => Config::config_file_path()?,
            };

            if init {
                config.save_to(&config_path)?;
                println!("Configuration initialized at {:?}", config_path);
            } else {
                println!("Configuration:");
                println!("{}", toml::to_string_pretty(&config)?);
                println!("\nConfig file: {:?}", config_path);
                println!("Projects dir: {:?}", config.projects_dir()?);
            }
        }
    }

    Ok(())
}
