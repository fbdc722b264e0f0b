mod chapters;
mod cli;
mod commands;
mod error;
mod mcp;
mod page_range;
mod pdf;
mod table;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the MCP channel on stdout stays clean
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Split {
            path,
            source,
            output_dir,
            prefix,
            keep_going,
            force,
            jobs,
            json,
        } => {
            let args = commands::split::SplitArgs {
                path,
                source,
                output_dir,
                prefix,
                keep_going,
                force,
                jobs,
                json,
            };
            commands::split::run(args).await?;
        }
        Commands::Check {
            path,
            source,
            output_dir,
            prefix,
            json,
        } => {
            commands::check::run(&path, &source, &output_dir, prefix, json)?;
        }
    }

    Ok(())
}
