use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webagent::config::Settings;
use webagent::generator::ActionGenerator;
use webagent::llm::{CompletionGateway, LlmClient};
use webagent::reducer::HtmlReducer;
use webagent::server::{self, AppState};

/// HTTP bridge between the web-automation benchmark harness and the LLM
/// providers.
#[derive(Parser, Debug)]
#[command(name = "webagent", version)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "WEBAGENT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "WEBAGENT_PORT", default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    info!(
        "provider={} reduction_model={} generation_model={}",
        settings.llm_provider, settings.html_reduction_model, settings.action_generation_model
    );

    // Credential and provider checks happen here, before any request is
    // served.
    let gateway: Arc<dyn CompletionGateway> = Arc::new(LlmClient::new(&settings)?);

    let state = Arc::new(AppState {
        reducer: HtmlReducer::new(gateway.clone()),
        generator: ActionGenerator::new(gateway),
    });

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
