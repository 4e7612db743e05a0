//! igdm-client: command-line client for the Instagram DM server
//!
//! Usage:
//!   igdm-client                      - Interactive mode
//!   igdm-client read 5               - Run one command and exit
//!   igdm-client --server URL ...     - Talk to another server

use clap::Parser;
use igdm_client::{execute, run_interactive, Command, RpcClient, DEFAULT_SERVER_URL};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "igdm-client", version, about = "Instagram DM MCP Client")]
struct Args {
    /// JSON-RPC endpoint of the server
    #[arg(short, long, env = "IGDM_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Command to run once instead of starting the interactive loop
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    println!("Instagram DM MCP Client");
    println!("Type 'help' for available commands.");

    let client = RpcClient::new(args.server);

    if args.command.is_empty() {
        return run_interactive(&client).await;
    }

    let output = match Command::parse_words(&args.command) {
        Ok(command) => execute(&client, &command).await,
        Err(e) => Err(e),
    };
    match output {
        Ok(text) if !text.is_empty() => println!("{}", text),
        Ok(_) => {}
        Err(e) => println!("{}", e),
    }

    Ok(())
}
