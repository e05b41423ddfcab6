mod cli;

use anyhow::Result;
use buri::commands;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // `.env` may carry the log settings, so it is read before tracing starts.
    buri_core::config::load_dotenv();
    buri_core::observability::init_tracing();
    buri_core::config::warn_deprecated_env_vars();
    let cli = Cli::parse();

    match cli.command {
        Commands::Update(args) => commands::update::cmd_update(args.into())?,
        Commands::Runner {
            ip,
            token,
            status,
            url,
        } => commands::runner::cmd_runner(&ip, &token, status, &url)?,
        Commands::Fetch { url, method, data } => commands::fetch::cmd_fetch(&url, method, &data)?,
        Commands::Ping { host } => commands::ping::cmd_ping(&host)?,
    }
    Ok(())
}
