//! dbtgraph CLI - dbt projects as fine-grained build-graph targets

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{compiled, deps, env, ls, run, script, spec, tailor};
use dg_core::DbtCommand;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = dispatch(&cli).await {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Spec(args) => spec::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Tailor(args) => tailor::execute(args, &cli.global).await,
        cli::Commands::Env(args) => env::execute(args, &cli.global).await,
        cli::Commands::Script(args) => script::execute(args, &cli.global).await,
        cli::Commands::Parse(args) => run::execute(DbtCommand::Parse, args, &cli.global).await,
        cli::Commands::Compile(args) => run::execute(DbtCommand::Compile, args, &cli.global).await,
        cli::Commands::Install(args) => run::execute(DbtCommand::Deps, args, &cli.global).await,
        cli::Commands::Deps(args) => deps::execute(args, &cli.global).await,
        cli::Commands::Compiled(args) => compiled::execute(args, &cli.global).await,
    }
}

/// Route `log` records from the libraries through a `RUST_LOG`-aware subscriber
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
