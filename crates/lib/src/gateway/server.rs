//! Gateway HTTP server.

use crate::config::{self, Config, UpstreamSettings};
use crate::envelope::{Envelope, UpstreamRequest};
use crate::gateway::cors::build_cors_layer;
use crate::gateway::error::ApiError;
use crate::gateway::protocol::ConnectionReport;
use crate::upstream::{UpstreamClient, UpstreamError};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared state for the gateway. Immutable after startup; cloned per request.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub settings: Arc<UpstreamSettings>,
    pub upstream: UpstreamClient,
}

impl GatewayState {
    pub fn new(config: Config, settings: UpstreamSettings) -> Self {
        let upstream = UpstreamClient::new(settings.endpoint_url.clone(), settings.token.clone());
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            upstream,
        }
    }
}

/// Build the router (routes + CORS). Fails on an unusable CORS config.
pub fn router(state: GatewayState) -> Result<Router> {
    let cors = build_cors_layer(&state.config.gateway.cors)?;
    Ok(Router::new()
        .route("/test-connection", get(test_connection))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state))
}

/// Resolve upstream settings, bind, and serve until SIGINT or SIGTERM.
pub async fn run_gateway(config: Config) -> Result<()> {
    let settings = UpstreamSettings::resolve(&config)?;
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::new(config, settings);
    if !state.upstream.has_token() {
        log::warn!(
            "no upstream token configured ({} unset); forwarding without Authorization",
            config::TOKEN_ENV
        );
    }
    log::info!("forwarding to {}", state.upstream.endpoint_url());
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Probe the upstream with the canned prompt. Every failure is folded into the report.
pub async fn check_connection(state: &GatewayState) -> ConnectionReport {
    let settings = &state.settings;
    match state
        .upstream
        .probe(&settings.health_prompt, settings.health_timeout)
        .await
    {
        Ok(body) => {
            log::info!("connection check succeeded");
            ConnectionReport::connected(body)
        }
        Err(e) => {
            log::warn!("connection check failed: {}", e);
            ConnectionReport::failed(e.to_string())
        }
    }
}

/// GET /test-connection — always 200; failure is reported in the body.
async fn test_connection(State(state): State<GatewayState>) -> Json<ConnectionReport> {
    Json(check_connection(&state).await)
}

/// POST /ask — normalize the envelope, forward it, relay the upstream JSON verbatim.
async fn ask(
    State(state): State<GatewayState>,
    body: Result<Json<Envelope>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(envelope) = body?;
    let request = UpstreamRequest::from(envelope.resolve()?);
    log::debug!("forwarding {} message(s) upstream", request.input.len());

    match state
        .upstream
        .invoke(&request, state.settings.ask_timeout)
        .await
    {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            match &e {
                UpstreamError::Status { status, body } => {
                    log::warn!("upstream returned {}: {}", status, body);
                }
                other => log::warn!("ask failed: {}", other),
            }
            Err(e.into())
        }
    }
}
