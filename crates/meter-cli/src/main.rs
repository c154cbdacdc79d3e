use clap::Parser;

mod cli;
mod logger;
mod run;
mod scenario;

use cli::{Cli, Command};

// The harness is single threaded, like the page it runs in.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    match cli.command {
        Command::Run(args) => run::run(args).await,
    }
}
