//! dw - Darkwatch operator client
//!
//! Signs operators in against the Darkwatch API, keeps the session on
//! disk, and tails the live threat feed.
//!
//! # Examples
//!
//! ```bash
//! # Sign in (password from DW_PASSWORD)
//! dw login alice
//!
//! # Authorized API call
//! dw get /stats --pretty
//!
//! # Follow critical events only
//! dw feed --critical-only
//! ```

mod app;
mod cli;
mod commands;
mod error;
mod logger;
mod render;


use crate::{app::App, cli::Cli, error::Result as CliResult};

use dw_config::Config;

use std::process::ExitCode;

use clap::Parser;
use log::error;
use serde_json::Value;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.api.base_url = server;
    }
    config.validate()?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        config.log_file_path()?,
        config.logging.colored,
    )?;
    config.log_summary();

    let app = App::new(config)?;
    if let Some(value) = app.run(cli.command, cli.pretty).await? {
        print_json(&value, cli.pretty)?;
    }

    Ok(())
}

fn print_json(value: &Value, pretty: bool) -> CliResult<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;

    println!("{output}");
    Ok(())
}
