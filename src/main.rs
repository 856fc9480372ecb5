mod api_doc;
mod config;
mod envelope;
mod handlers;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_env;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_doc::ApiDoc;
use config::Config;
use handlers::{create_handler, health_handler, list_handler};
use state::AppState;
use store::SpannerStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("spanner-records starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = SpannerStore::from_config(&config).await?;

    let bind_addr = format!("{}:{}", config.service_host, config.service_port);

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(routes::RECORDS, get(list_handler).post(create_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
