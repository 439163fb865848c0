//! code-starter - serves starter project archives

use anyhow::Result;
use clap::Parser;
use starter_server::{init_logging, run_server, CliArgs, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_format)?;

    let config = ServerConfig::from_args(args)?;
    run_server(config).await
}
