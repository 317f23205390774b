use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use expert_chat::cli;
use expert_chat::config::Config;
use expert_chat::mode::Mode;
use expert_chat::providers::openai::OpenAiProvider;
use expert_chat::responder::ExpertResponder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let initial_mode = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Mode>().context("invalid mode argument")?,
        None => Mode::HealthExpert,
    };

    let config = Config::load().context("failed to load configuration")?;
    let provider = OpenAiProvider::from_config(&config)?;
    let responder = ExpertResponder::new(Arc::new(provider), config.model, config.temperature);

    cli::run(&responder, initial_mode).await
}
