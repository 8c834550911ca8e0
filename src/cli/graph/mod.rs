//! Graph command - prints the workflow graph

use clap::{Args, ValueEnum};

use crate::domain::workflow::graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Json,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = GraphFormat::Mermaid)]
    pub format: GraphFormat,
}

pub fn run(args: GraphArgs) -> anyhow::Result<()> {
    println!("{}", render(args.format)?);
    Ok(())
}

fn render(format: GraphFormat) -> anyhow::Result<String> {
    match format {
        GraphFormat::Mermaid => Ok(graph::mermaid()),
        GraphFormat::Json => Ok(serde_json::to_string_pretty(&graph::structure())?),
    }
}
