use std::{net::SocketAddr, time::Duration};

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    routing::post,
    Router,
};
use axum_server::Handle;
use tokio::task::JoinHandle;
use tower_http::set_header::SetResponseHeaderLayer;

use super::{
    app_state::AppState,
    auth::BearerAuth,
    routes::{deploy, ipns_update, not_found, preflight},
    trace::with_trace_layer,
};
use crate::{
    constants::{DEPLOY_PATH, NAME_UPDATE_PATH},
    AppContext, AppContextConversionError, DataDir,
};

/// Create the router. Every response, errors included, carries the CORS headers.
pub(crate) fn create_app(state: AppState) -> Router {
    let app = Router::new()
        .route(
            DEPLOY_PATH,
            post(deploy::deploy).options(preflight).fallback(not_found),
        )
        .route(
            NAME_UPDATE_PATH,
            post(ipns_update::update)
                .options(preflight)
                .fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST"),
        ));

    with_trace_layer(app)
}

/// Build the full router, services included, from a context.
pub fn create_router(context: &AppContext) -> Result<Router, AppContextConversionError> {
    let auth = BearerAuth::new(context.config_toml.name_service.incoming_api_key.clone());
    if !auth.is_configured() {
        tracing::warn!("No incoming API key configured. Every name update will be refused.");
    }
    let state = AppState::new(
        context.site_deployer()?,
        context.name_update_service(),
        auth,
    );
    Ok(create_app(state))
}

/// Errors that can occur when building a `Me3Server`.
#[derive(thiserror::Error, Debug)]
pub enum Me3ServerBuildError {
    /// Failed to bind or run the http server.
    #[error("Failed to create server: {0}")]
    Server(anyhow::Error),

    /// Failed to bootstrap from the data directory or config.
    #[error("Failed to bootstrap from the data directory: {0}")]
    DataDir(#[from] AppContextConversionError),
}

/// The deploy and name update server.
///
/// When dropped, the server will stop.
pub struct Me3Server {
    http_handle: Handle<SocketAddr>,
    join_handle: JoinHandle<()>,
    socket: SocketAddr,
    context: AppContext,
}

impl Me3Server {
    /// Start a server from a data directory.
    pub async fn from_data_dir(data_dir: DataDir) -> Result<Self, Me3ServerBuildError> {
        let context = AppContext::read_from(data_dir)?;
        Self::start(context).await
    }

    /// Start a server on in-memory services.
    #[cfg(any(test, feature = "testing"))]
    pub async fn test() -> Result<Self, Me3ServerBuildError> {
        Self::start(AppContext::test()).await
    }

    /// Bind the configured socket and serve in the background.
    pub async fn start(context: AppContext) -> Result<Self, Me3ServerBuildError> {
        let app = create_router(&context)?;

        let listener = std::net::TcpListener::bind(context.config_toml.http.listen_socket)
            .map_err(|e| Me3ServerBuildError::Server(e.into()))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| Me3ServerBuildError::Server(e.into()))?;
        let socket = listener
            .local_addr()
            .map_err(|e| Me3ServerBuildError::Server(e.into()))?;

        let http_handle = Handle::new();
        let inner_http_handle = http_handle.clone();
        let server =
            axum_server::from_tcp(listener).map_err(|e| Me3ServerBuildError::Server(e.into()))?;
        let join_handle = tokio::spawn(async move {
            server
                .handle(inner_http_handle)
                .serve(app.into_make_service())
                .await
                .unwrap_or_else(|e| tracing::error!("Server error: {}", e));
        });

        tracing::info!("Listening on http://{socket}");
        Ok(Self {
            http_handle,
            join_handle,
            socket,
            context,
        })
    }

    pub fn listen_socket(&self) -> SocketAddr {
        self.socket
    }

    /// Base url of the server, e.g. `http://127.0.0.1:8888/`.
    pub fn url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}/", self.socket)).expect("socket address is a valid host")
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }
}

impl Drop for Me3Server {
    fn drop(&mut self) {
        self.http_handle
            .graceful_shutdown(Some(Duration::from_secs(5)));
        self.join_handle.abort();
    }
}
