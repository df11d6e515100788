//! HTTP server setup for the standalone binary.
//!
//! # Responsibilities
//! - Create the Axum router: catch-all upstream handler behind the gate
//! - Wire up tower-http middleware (trace, upstream request timeout)
//! - Serve on a listener until shutdown is signalled

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::ServerConfig;
use crate::http::gate::Warden;
use crate::http::proxy::{self, HttpClient, ProxyError, ServiceTarget, TargetError};

/// State for the pass-through handler.
#[derive(Clone)]
struct UpstreamState {
    target: Arc<ServiceTarget>,
    client: HttpClient,
    timeout: Duration,
}

/// Maintenance gate in front of a single upstream.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, warden: Warden) -> Result<Self, TargetError> {
        let target = ServiceTarget::parse(&config.upstream)?;
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let state = UpstreamState {
            target: Arc::new(target),
            client: proxy::build_client(),
            timeout,
        };

        let router = Self::build_router(state, Arc::new(warden), timeout);
        Ok(Self { router, config })
    }

    /// The request timeout bounds pass-through traffic only; maintenance
    /// responses are bounded by the gate's own service timeout.
    fn build_router(state: UpstreamState, warden: Arc<Warden>, timeout: Duration) -> Router {
        let routes = Router::new()
            .route("/{*path}", any(upstream_handler))
            .route("/", any(upstream_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, timeout));

        warden.attach(routes).layer(TraceLayer::new_for_http())
    }

    /// Router with the gate and middleware applied, for embedding or tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, upstream = %self.config.upstream, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward a request that passed the gate to the upstream.
async fn upstream_handler(
    State(state): State<UpstreamState>,
    request: Request<Body>,
) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (parts, body) = request.into_parts();

    let result = match state.target.build_request(&parts, body, client_ip) {
        Ok(outbound) => proxy::forward(&state.client, outbound, state.timeout).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            let (upstream, body) = response.into_parts();
            let mut response = Response::new(body);
            *response.status_mut() = upstream.status;
            proxy::copy_end_to_end(&upstream.headers, response.headers_mut(), &[]);
            response
        }
        Err(ProxyError::Timeout(after)) => {
            tracing::error!(path = %parts.uri.path(), timeout = ?after, "Upstream timed out");
            (StatusCode::GATEWAY_TIMEOUT, "Upstream timed out").into_response()
        }
        Err(e) => {
            tracing::error!(path = %parts.uri.path(), error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
