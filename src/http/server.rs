//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every JSON route
//! - Wire up middleware (request ID, tracing, whole-request timeout, metrics)
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::blockchain::client::ChainProvider;
use crate::blockchain::factory::ProviderFactory;
use crate::blockchain::types::{BlockchainError, BlockchainResult, NetworkKey};
use crate::config::ExplorerConfig;
use crate::http::request::{request_span, MakeRequestUuid, X_REQUEST_ID};
use crate::http::{account, blocks, nft, transaction, transfers};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<dyn ProviderFactory>,
    pub config: Arc<ExplorerConfig>,
}

impl AppState {
    /// Network-scoped provider handle for one operation.
    pub fn provider(&self, network: NetworkKey) -> BlockchainResult<Arc<dyn ChainProvider>> {
        self.factory.connect(network)
    }
}

/// HTTP server for the explorer API.
pub struct HttpServer {
    router: Router,
    config: Arc<ExplorerConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ExplorerConfig, factory: Arc<dyn ProviderFactory>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            factory,
            config: config.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ExplorerConfig, state: AppState) -> Router {
        let request_secs = config.timeouts.request_secs;

        Router::new()
            .route("/api/send-transaction", post(transaction::send_transaction))
            .route("/api/transaction", get(transaction::get_transaction))
            .route("/api/transfers", get(transfers::get_transfers))
            .route("/api/account", get(account::get_account))
            .route("/api/account/info", get(account::get_account_info))
            .route("/api/account/transactions", get(transfers::get_account_transactions))
            .route("/api/blocks", get(blocks::get_blocks))
            .route("/api/blocks/with-transactions", get(blocks::get_blocks_with_transactions))
            .route("/api/nft", get(nft::get_nfts))
            .route("/api/nft/metadata", get(nft::get_nft_metadata))
            .route("/health", get(health))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(HandleErrorLayer::new(move |error: BoxError| async move {
                        request_failed(error, request_secs)
                    }))
                    .layer(TimeoutLayer::new(Duration::from_secs(request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Errors raised by the outer layers, rendered like handler errors.
fn request_failed(error: BoxError, request_secs: u64) -> Response {
    if error.is::<Elapsed>() {
        return BlockchainError::Timeout(request_secs).into_response();
    }
    tracing::error!(error = %error, "Unhandled middleware error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;
    metrics::record_request(&route, &method, response.status().as_u16(), start);
    response
}
