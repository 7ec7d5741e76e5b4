pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "music-catalog-api")]
#[command(about = "Music catalog REST API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port, overrides API_PORT/PORT")]
        port: Option<u16>,

        #[arg(long, help = "Use in-memory stores instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Create catalog and account tables if missing")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        in_memory: false,
    }) {
        Commands::Serve { port, in_memory } => commands::serve::handle(port, in_memory).await,
        Commands::Migrate => commands::migrate::handle().await,
    }
}
