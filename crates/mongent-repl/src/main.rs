mod config;
mod repl;

use anyhow::Result;
use config::{Settings, ALLOWED_OPERATIONS, BRIDGE_COMMAND};
use mongent_agent::{Agent, AgentConfig};
use mongent_llm::ClientFactory;
use mongent_mcp::{BridgeConfig, MCPClient, MCPToolExecutor, ToolExecutor};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let settings = Settings::from_env()?;

    tracing::info!(
        provider = settings.provider_name(),
        model = %settings.model_name(),
        "starting MongoDB agent"
    );

    let bridge_config = BridgeConfig::new(BRIDGE_COMMAND, settings.bridge_args());
    let bridge = Arc::new(MCPClient::connect(bridge_config).await?);

    // From here on the bridge subprocess must be closed on every exit path
    let result = run(&settings, bridge.clone()).await;
    bridge.close().await;
    result
}

async fn run(settings: &Settings, bridge: Arc<MCPClient>) -> Result<()> {
    let catalog = mongent_mcp::load_tools(&bridge, &ALLOWED_OPERATIONS).await?;
    let tools = mongent_mcp::to_llm_tools(&catalog);

    let executor = Arc::new(MCPToolExecutor::new(bridge.clone(), &catalog));
    tracing::info!(operations = executor.list_tools().len(), "tool catalog loaded");

    let client = ClientFactory::create_chat_client(settings.provider_config())?;

    let mut agent_config =
        AgentConfig::new(settings.model_name()).with_max_steps(settings.max_steps);
    if let Some(temperature) = settings.temperature {
        agent_config = agent_config.with_temperature(temperature);
    }

    let agent = Agent::new(client, executor, tools, agent_config);

    repl::run(&agent).await
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Keep stdout for answers; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
