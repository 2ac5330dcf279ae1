use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};

mod api;
mod cache;
mod cli;
mod commands;
mod db;
mod goals;
mod models;
mod progress;
mod schedule;
mod session;
mod types;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = dirs::data_dir()
        .context("Could not determine data directory")?
        .join("stride");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir `{}`", data_dir.display()))?;
    let db_path = data_dir.join("stride.db");

    let pool = db::open(&db_path.to_string_lossy()).await?;

    match cli.cmd {
        Commands::Goals(cmd) => commands::goals::handle(cmd, &pool).await?,
        Commands::Generate { force, start_in, level } => {
            commands::generate::handle(force, start_in, level, &pool).await?
        }
        Commands::Program(cmd) => commands::program::handle(cmd, &pool).await?,
        Commands::Sync => commands::sync::handle(&pool).await?,
        Commands::Calendar { year, month } => commands::calendar::handle(&pool, year, month).await?,
        Commands::Session(cmd) => commands::session::handle(cmd, &pool).await?,
        Commands::Status => commands::status::handle(&pool).await?,
        Commands::Config(cmd) => commands::config::handle(cmd).await?,
    }

    Ok(())
}
