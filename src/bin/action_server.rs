use finance_action_server::{api::start_server, create_default_registry, ActionServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ActionServerConfig::from_env()?;

    info!("🚀 Finance Action Server");
    info!("📍 Port: {}", config.port);
    info!("🏦 Backend: {}", config.api_url);
    info!("🤖 Model: {} (via {})", config.model, config.ollama_bin);
    if config.default_token.is_empty() {
        info!("No DEFAULT_TOKEN set; requests without a conversation token go unauthenticated");
    }

    let registry = Arc::new(create_default_registry(&config)?);
    info!("✅ Registered actions: {}", registry.list().join(", "));

    start_server(registry, config.port).await?;

    Ok(())
}
