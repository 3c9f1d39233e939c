//! HTTP + WebSocket front end.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use exhibit_common::ExhibitError;
use exhibit_config::ExhibitConfig;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::connection::{handle_connection, stop_requested, Heartbeat};
use crate::registry::Registry;
use crate::relay::Relay;
use crate::roster::spawn_roster_task;


/// Shared state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub heartbeat: Option<Heartbeat>,
    pub started_at: DateTime<Utc>,
    /// Flips to `true` when the server shuts down.
    pub shutdown: watch::Receiver<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PersonsQuery {
    #[serde(rename = "excludeId")]
    pub exclude_id: Option<String>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/persons", get(persons_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind, spawn the roster task and start serving. Returns once listening.
pub async fn start(config: &ExhibitConfig) -> Result<ServerHandle, ExhibitError> {
    let registry = Registry::new(config.relay.send_queue as usize);
    let relay = Relay::new(registry.clone(), config.relay.trust_client_ids);

    let roster = spawn_roster_task(
        registry.clone(),
        Duration::from_millis(u64::from(config.roster.debounce_ms)),
    );

    let listener = TcpListener::bind(config.server.bind_addr()).await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState {
        relay,
        heartbeat: Heartbeat::from_config(&config.heartbeat),
        started_at: Utc::now(),
        shutdown: shutdown_rx.clone(),
    };
    let router = build_router(state);

    let mut server_stop = shutdown_rx;
    let server = tokio::spawn(async move {
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { stop_requested(&mut server_stop).await })
        .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Server error");
        }
    });

    tracing::info!(
        addr = %addr,
        trust_client_ids = config.relay.trust_client_ids,
        debounce_ms = config.roster.debounce_ms,
        "Exhibit relay listening"
    );

    Ok(ServerHandle {
        addr,
        registry,
        shutdown: shutdown_tx,
        server,
        roster,
    })
}

/// Handle returned by `start()`. Dropping it without `shutdown()` also
/// stops the server and closes every connection.
pub struct ServerHandle {
    addr: SocketAddr,
    registry: Registry,
    shutdown: watch::Sender<bool>,
    server: JoinHandle<()>,
    roster: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Stop accepting, close every WebSocket and wait until each connection
    /// has left the registry, then stop publishing rosters.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        if let Err(e) = self.server.await {
            tracing::warn!(error = %e, "Server task ended abnormally");
        }
        // Each connection task holds a receiver until its cleanup is done.
        self.shutdown.closed().await;
        self.roster.abort();
        tracing::info!(
            participants = self.registry.count().await,
            "Relay stopped"
        );
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        handle_connection(socket, peer, state.relay, state.heartbeat, state.shutdown)
    })
}

/// `GET /api/persons?excludeId=<id>`
async fn persons_handler(
    State(state): State<AppState>,
    Query(query): Query<PersonsQuery>,
) -> impl IntoResponse {
    let persons = state
        .relay
        .registry()
        .snapshot(query.exclude_id.as_deref())
        .await;
    Json(persons)
}

/// Health check HTTP endpoint.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let participants = state.relay.registry().count().await;
    Json(serde_json::json!({
        "status": "ok",
        "participants": participants,
        "startedAt": state.started_at.to_rfc3339(),
    }))
}
