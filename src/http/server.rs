//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, optional request bound)
//! - Build the shared application state
//! - Bind server to listener and apply config reloads
//!
//! # Routes
//! ```text
//! GET  /                  echo
//! GET  /connection        status page
//! GET  /p/{proto}/{*target} proxy
//! POST /errors/{rate}     set error percent
//! POST /latency/{ms}      set latency
//! POST /crash/{message}   terminate
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::TesterConfig;
use crate::faults::FaultController;
use crate::http::control::CrashHook;
use crate::http::headers::build_response_headers;
use crate::http::response::ServiceReply;
use crate::http::{control, echo, proxy, status_page};
use crate::identity::{IdentitySnapshot, UNSET};
use crate::observability::metrics;
use crate::proxy::Forwarder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentitySnapshot>,
    pub faults: Arc<FaultController>,
    pub forwarder: Forwarder,
    /// `Proxied-By` value for this service.
    pub proxied_by: HeaderValue,
    pub crash_hook: CrashHook,
}

impl AppState {
    pub fn new(config: &TesterConfig, identity: IdentitySnapshot) -> Self {
        let proxied_by = HeaderValue::from_str(&identity.service_name).unwrap_or_else(|_| {
            tracing::warn!(service = %identity.service_name, "service name is not a valid header value");
            HeaderValue::from_static(UNSET)
        });

        Self {
            identity: Arc::new(identity),
            faults: Arc::new(FaultController::new(config.faults)),
            forwarder: Forwarder::new(&config.upstream),
            proxied_by,
            crash_hook: control::exit_process(),
        }
    }

    /// Replace what `POST /crash/{message}` does.
    pub fn with_crash_hook(mut self, hook: CrashHook) -> Self {
        self.crash_hook = hook;
        self
    }
}

/// Answer 504 with the diagnostic headers once a request outlives `limit`.
async fn bound_request(
    State((state, limit)): State<(AppState, Duration)>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, limit_secs = limit.as_secs(), "request exceeded server timeout");
            let reply = ServiceReply::timed_out(&state.identity.service_name);
            metrics::record_request("timeout", reply.status_code, start);
            reply.into_response(build_response_headers(start, &state.identity))
        }
    }
}

/// HTTP server for the tester.
pub struct HttpServer {
    router: Router,
    config: TesterConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: TesterConfig, identity: IdentitySnapshot) -> Self {
        let state = AppState::new(&config, identity);
        Self::with_state(config, state)
    }

    /// Create a server around prepared state.
    pub fn with_state(config: TesterConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &TesterConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", get(echo::echo))
            .route("/connection", get(status_page::connection))
            .route("/p/{proto}/{*target}", get(proxy::proxy))
            .route("/errors/{rate}", post(control::set_errors))
            .route("/latency/{ms}", post(control::set_latency))
            .route("/crash/{message}", post(control::crash))
            .with_state(state.clone());

        let router = match config.timeouts.request_secs {
            Some(secs) => router.layer(middleware::from_fn_with_state(
                (state, Duration::from_secs(secs)),
                bound_request,
            )),
            None => router,
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Each config received on `config_updates` replaces the live fault
    /// settings. Returns once `shutdown` fires and in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<TesterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.state.identity.service_name,
            "HTTP server starting"
        );

        let faults = self.state.faults.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                tracing::info!(
                    latency_ms = config.faults.latency_ms,
                    error_percent = config.faults.error_percent,
                    "Applying reloaded fault settings"
                );
                faults.replace(config.faults);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
