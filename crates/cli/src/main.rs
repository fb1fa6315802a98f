//! StudyBuddy CLI, the main entry point.
//!
//! Commands:
//! - `init`       Write the default config file
//! - `serve`      Start the HTTP API
//! - `chat`       Interactive chat or single-message mode
//! - `upload`     Add a file to the material store
//! - `materials`  List stored materials

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "studybuddy",
    about = "StudyBuddy: an AI study assistant over your own materials",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and print the agent's thought process
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with StudyBuddy
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Focus on a material (repeatable)
        #[arg(long = "material", value_name = "ID")]
        materials: Vec<String>,
    },

    /// Upload a study file (txt, md, pdf, docx or pptx)
    Upload {
        path: PathBuf,

        /// Title to store instead of the file name
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List stored materials
    Materials,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message, materials } => {
            commands::chat::run(message, materials, cli.verbose).await?
        }
        Commands::Upload { path, title } => commands::upload::run(&path, title.as_deref()).await?,
        Commands::Materials => commands::materials::run().await?,
    }

    Ok(())
}
