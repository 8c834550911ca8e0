//! Command line entry points
//!
//! - `serve`: HTTP API with background process execution
//! - `run`: one synchronous decision run printed as JSON
//! - `graph`: the workflow graph as Mermaid or JSON

pub mod graph;
pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

/// Decision Flow - evaluator-guided decision workflow
#[derive(Parser)]
#[command(name = "decision-flow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Run one decision and print the result
    Run(run::RunArgs),

    /// Print the workflow graph
    Graph(graph::GraphArgs),
}
