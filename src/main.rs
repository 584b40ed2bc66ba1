//! modgraph CLI entry point
//!
//! Parses the command line, runs the selected command and turns failures into
//! user-friendly messages with suggestions.
//!
//! - `plan` - classify a dependency graph into modules
//! - `validate` - check modgraph.toml
//! - `modules` - list configured modules

use anyhow::Result;
use clap::Parser;
use modgraph_cli::cli;
use modgraph_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
