use super::handlers::{
    handle_generate_documents, handle_health, handle_regenerate_letter,
    handle_regenerate_narrative,
};
use super::{AppState, MAX_BODY_SIZE};

use crate::config::{Config, GatewayConfig};
use crate::generation::{GenerationOrchestrator, create_generator};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway on the configured host and port until Ctrl-C.
pub async fn run_gateway(config: &Config) -> Result<()> {
    let host = &config.gateway.host;
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from other machines.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{}", config.gateway.port)
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    let generator = create_generator(&config.generation).context("create document generator")?;
    let orchestrator = GenerationOrchestrator::new(generator).with_artifact_timeout(
        Duration::from_secs(config.generation.artifact_timeout_secs),
    );
    orchestrator.warmup().await;

    run_gateway_with_listener(listener, AppState { orchestrator }, &config.gateway).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    state: AppState,
    gateway: &GatewayConfig,
) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;

    print_gateway_banner(&local_addr, state.orchestrator.generator_name());
    tracing::info!(
        addr = %local_addr,
        generator = state.orchestrator.generator_name(),
        "gateway started"
    );

    let app = build_app(
        state,
        &gateway.cors_origins,
        Duration::from_secs(gateway.request_timeout_secs),
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}

fn print_gateway_banner(addr: &SocketAddr, generator: &str) {
    println!("Gateway listening on {addr} (generator: {generator})");
    println!("  POST /api/generate-documents");
    println!("  POST /api/regenerate-narrative");
    println!("  POST /api/regenerate-letter");
    println!("  GET  /health");
}

pub fn build_app(state: AppState, cors_origins: &[String], request_timeout: Duration) -> Router {
    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route("/api/generate-documents", post(handle_generate_documents))
        .route(
            "/api/regenerate-narrative",
            post(handle_regenerate_narrative),
        )
        .route("/api/regenerate-letter", post(handle_regenerate_letter))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
