//! Run command - one synchronous decision run

use clap::Args;

use crate::api::types::DecisionResponse;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::services::DecisionService;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The decision to analyze
    pub query: String,

    /// Include the visited node history in the output
    #[arg(long)]
    pub history: bool,
}

/// Run the workflow inline and print the summary as JSON
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let engine = crate::create_decision_engine(&config)?;
    let service = DecisionService::new(engine);

    println!("{}", render(&service, &args).await?);
    Ok(())
}

async fn render(service: &DecisionService, args: &RunArgs) -> anyhow::Result<String> {
    let result = service.run(&args.query).await?;
    let response = DecisionResponse::from_run(&result, args.history);
    Ok(serde_json::to_string_pretty(&response)?)
}
