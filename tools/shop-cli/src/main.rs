//! Shop CLI - inspect and exercise the storefront shell from a terminal.
//!
//! Commands:
//! - `shop routes` - Print the route table with its protection flags
//! - `shop whoami` - Load the current user from the backend
//! - `shop navigate` - Run navigations through the guarded router

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shop_core::LogFormat;

use commands::{NavigateArgs, RoutesArgs, WhoamiArgs};

/// Shop CLI - storefront shell tooling
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route table
    Routes(RoutesArgs),

    /// Fetch the signed-in user
    Whoami(WhoamiArgs),

    /// Navigate through the guarded router
    Navigate(NavigateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json { LogFormat::Json } else { LogFormat::Human };
    if let Err(e) = shop_core::init_tracing(format, cli.verbose) {
        eprintln!("{}", e);
    }

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Routes(args) => commands::routes::run(args, &ctx).await,
        Commands::Whoami(args) => commands::whoami::run(args, &ctx).await,
        Commands::Navigate(args) => commands::navigate::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
