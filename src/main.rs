use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Server,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use axum_todo_auth_server::{config::Config, route::create_router, AppState};

/// Initializes tracing collection, filtered by `RUST_LOG` (defaults to `info`)
fn setup_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().compact())
        .init();
}

// Entry point of the application
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    setup_tracing();

    let app_state = Arc::new(
        AppState::connect(&config)
            .await
            .context("Failed to connect to the database")?,
    );

    // Configure CORS settings for the application
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let app = create_router(app_state, config.request_timeout)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(listen = %config.listen, "Server started successfully");

    Server::bind(&config.listen)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
