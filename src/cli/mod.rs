//! CLI module for the video game catalog.
//!
//! Subcommands:
//! - `init`: Create the schema and seed sample data
//! - `serve`: Run the web server (HTML pages and JSON API)

mod init;
mod serve;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::context::Context;
use crate::migrations::{reset, run_migrations};

/// Video game catalog
#[derive(Parser)]
#[command(name = "videogames")]
#[command(about = "Video game catalog - HTML pages and JSON API over PostgreSQL")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the schema and seed sample data
    Init {
        /// Drop existing tables (and their data) first
        #[arg(long)]
        reset: bool,
    },

    /// Run the web server
    Serve {
        /// Host address to bind to [default: server.host]
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on [default: server.port]
        #[arg(long)]
        port: Option<u16>,

        /// Drop, recreate and reseed the catalog before serving
        #[arg(long)]
        reset: bool,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Init { reset } => self.run_init(reset).await,
            Command::Serve {
                ref host,
                port,
                reset,
            } => self.run_serve(host.as_deref(), port, reset).await,
        }
    }
}

/// Bring the schema up to date, optionally dropping everything first.
async fn prepare_schema(ctx: &Context, drop_first: bool) -> Result<()> {
    if drop_first {
        reset(ctx.db.as_ref())
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Reset failed: {}", e))?;
    }

    tracing::info!("Running migrations...");
    let result = run_migrations(ctx.db.as_ref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Migration failed: {}", e))?;

    if result.applied_migrations.is_empty() {
        tracing::info!(
            "Database already at v{}, no migrations needed",
            result.current_version
        );
    } else {
        tracing::info!(
            "Migrations complete: v{} -> v{}, applied: {:?}",
            result.previous_version,
            result.current_version,
            result.applied_migrations
        );
    }
    Ok(())
}
