use clap::Parser;
use decision_flow::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Run(args) => cli::run::run(args).await,
        Command::Graph(args) => cli::graph::run(args),
    }
}
