use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "dw")]
#[command(about = "Darkwatch operator client: session management and live threat feed")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// API base URL (overrides [api].base_url from config.toml)
    #[arg(long, global = true)]
    pub(crate) server: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
