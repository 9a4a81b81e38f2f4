use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use skychat::chat::ChatService;
use skychat::config::AppConfig;
use skychat::llm::gemini::GeminiProvider;
use skychat::server::{get_app, AppState};
use skychat::tools::create_default_router;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    let api_key = config.api_key()?;
    info!(
        model = %config.llm.model,
        api_base = config.llm.api_base.as_deref().unwrap_or("(default)"),
        "configuration loaded"
    );

    let provider = GeminiProvider::new(api_key, config.llm.api_base.clone())?;
    let tools = create_default_router(&config.weather.points_base)?;
    let chat = ChatService::new(
        Box::new(provider),
        tools,
        config.llm.model.clone(),
        config.agent.max_tool_rounds,
    );

    let state = Arc::new(AppState { chat });
    let app = get_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
