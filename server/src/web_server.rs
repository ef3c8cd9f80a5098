use std::future::Future;
use std::path::Path;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use common::log;

use crate::server_config::ServerConfig;
use crate::session_registry::SessionRegistry;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState {
    pub registry: SessionRegistry,
}

/// `/` and `/ws` upgrade to the game socket; `/ui` serves the static client
/// when a directory is configured.
pub fn build_router(state: WebServerState, static_files_path: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(ws_upgrade_handler))
        .route("/ws", get(ws_upgrade_handler));

    if let Some(path) = static_files_path {
        log!("Serving static files from {} at /ui", path.display());
        router = router.nest_service("/ui", ServeDir::new(path));
    }

    router.layer(cors).with_state(state)
}

pub async fn bind(config: &ServerConfig) -> Result<TcpListener, String> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))
}

pub async fn run_web_server(
    listener: TcpListener,
    router: Router,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}
