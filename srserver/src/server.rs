//! # Server module
//!
//! High level wrapper around an Axum [`Router`]:
//!
//! - JSON routes from async closures with `add_route()`
//! - standard Axum handlers with `add_handler()`
//! - sub-routers with `add_router()`
//! - documented APIs (OpenAPI + Swagger UI) with `add_openapi()`
//! - a server-wide request timeout answering `408 Request Timeout`
//! - graceful shutdown on Ctrl+C

use axum::error_handling::HandleErrorLayer;
use axum::handler::Handler;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{BoxError, Json, Router};
use serde::Serialize;
use srconfig::Config;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tower::ServiceBuilder;
use tracing::{error, info};
use utoipa_swagger_ui::SwaggerUi;

/// Default server name
pub const DEFAULT_SERVER_NAME: &str = "SRAggregator";

/// Serializable server information
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ServerInfo {
    pub name: String,
    pub bind_address: String,
    pub http_port: u16,
}

/// Main server
pub struct Server {
    name: String,
    bind_address: String,
    http_port: u16,
    request_timeout: Duration,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl Server {
    /// Creates a new server
    ///
    /// # Arguments
    ///
    /// * `name` - Server name (for the logs)
    /// * `bind_address` - Address to listen on (e.g. "0.0.0.0")
    /// * `http_port` - HTTP port, `0` picks a free one
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
            request_timeout: Duration::from_secs(srconfig::DEFAULT_REQUEST_TIMEOUT_SECS),
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            local_addr: None,
        }
    }

    /// Creates a server from the `host` section of the configuration
    pub fn new_configured(config: &Config) -> Self {
        ServerBuilder::new_configured(config).build()
    }

    /// Sets the server-wide request timeout
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Adds a dynamic JSON route
    ///
    /// The closure is called on every GET to `path` and its result is
    /// serialized as JSON.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use srserver::Server;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut server = Server::new("Test", "127.0.0.1", 3000);
    /// server.add_route("/api/status", || async {
    ///     serde_json::json!({ "status": "online" })
    /// }).await;
    /// # }
    /// ```
    pub async fn add_route<F, Fut, T>(&mut self, path: &str, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f = Arc::new(f);
        let handler = move || {
            let f = f.clone();
            async move { Json(f().await) }
        };

        self.mount(path, Router::new().route("/", get(handler)))
            .await;
    }

    /// Adds a standard Axum GET handler
    pub async fn add_handler<H, T>(&mut self, path: &str, handler: H)
    where
        H: Handler<T, ()> + Clone + 'static,
        T: 'static,
    {
        self.mount(path, Router::new().route("/", get(handler)))
            .await;
    }

    /// Adds a sub-router
    ///
    /// - `"/"` merges it into the main router
    /// - any other path nests it below that path
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        let normalized = format!("/{}", path.trim_matches('/'));
        self.mount(&normalized, sub_router).await;
    }

    /// Adds a documented API with its OpenAPI document and Swagger UI
    ///
    /// - the routes are nested under `/api/{name}`
    /// - `/api-docs/{name}.json` serves the OpenAPI document
    /// - `/swagger-ui/{name}` serves the Swagger UI
    pub async fn add_openapi(
        &mut self,
        api_router: Router,
        openapi: utoipa::openapi::OpenApi,
        name: &str,
    ) {
        let swagger_path = format!("/swagger-ui/{}", name);
        let swagger_path_static: &'static str = Box::leak(swagger_path.into_boxed_str());

        let openapi_json_path = format!("/api-docs/{}.json", name);
        let openapi_json_path_static: &'static str = Box::leak(openapi_json_path.into_boxed_str());

        let swagger = SwaggerUi::new(swagger_path_static).url(openapi_json_path_static, openapi);

        let base_path = format!("/api/{}", name);
        let nested_router = Router::new().nest(&base_path, api_router);

        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(nested_router).merge(swagger);
    }

    async fn mount(&mut self, path: &str, route: Router) {
        let mut r = self.router.write().await;
        *r = if path == "/" {
            std::mem::take(&mut *r).merge(route)
        } else {
            std::mem::take(&mut *r).nest(path, route)
        };
    }

    /// Final router: every route registered so far behind the request timeout
    pub async fn router(&self) -> Router {
        self.router
            .read()
            .await
            .clone()
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .timeout(self.request_timeout)
                    .into_inner(),
            )
    }

    /// Starts the HTTP server
    ///
    /// Binds the listener (bind errors are returned), then serves in the
    /// background until Ctrl+C.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let listener =
            tokio::net::TcpListener::bind((self.bind_address.as_str(), self.http_port)).await?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);

        info!(
            "Server {} running at http://{}",
            self.name, local_addr
        );

        let app = self.router().await;
        self.join_handle = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                error!("Server error: {}", e);
            }
        }));

        Ok(())
    }

    /// Waits for the server to stop
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    /// Address actually bound, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Server information
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            bind_address: self.bind_address.clone(),
            http_port: self.local_addr.map(|a| a.port()).unwrap_or(self.http_port),
        }
    }
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(serde_json::json!({ "error": "request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Unhandled internal error: {error}") })),
        )
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down"),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    bind_address: String,
    http_port: u16,
    request_timeout: Duration,
}

impl ServerBuilder {
    /// Creates a new builder
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
            request_timeout: Duration::from_secs(srconfig::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Builder initialised from the `host` section of the configuration
    pub fn new_configured(config: &Config) -> Self {
        let timeout = config.get_request_timeout_secs().unwrap_or_else(|e| {
            tracing::warn!(
                "{}, using default request timeout {}s",
                e,
                srconfig::DEFAULT_REQUEST_TIMEOUT_SECS
            );
            srconfig::DEFAULT_REQUEST_TIMEOUT_SECS
        });

        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            bind_address: config.get_bind_address(),
            http_port: config.get_http_port(),
            request_timeout: Duration::from_secs(timeout),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the server
    pub fn build(self) -> Server {
        let mut server = Server::new(self.name, self.bind_address, self.http_port);
        server.set_request_timeout(self.request_timeout);
        server
    }
}
