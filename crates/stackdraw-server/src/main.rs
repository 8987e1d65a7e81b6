use anyhow::Context;
use clap::Parser;
use stackdraw_server::{create_router, AppState, ServerConfig};
use stackdraw_suggest::Pipeline;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "stackdraw_server=info,stackdraw_suggest=info,stackdraw_core=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let settings = stackdraw_core::load_settings();
    let pipeline = Pipeline::from_settings(&settings, config.pipeline_options());
    let app = create_router(AppState::new(pipeline), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("stackdraw listening on http://{}", config.bind);
    info!("allowed origins: {}", config.cors_origins.join(", "));

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
