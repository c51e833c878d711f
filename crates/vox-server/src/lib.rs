mod health;

use std::net::SocketAddr;

use axum::Router;
use tower_http::trace::TraceLayer;
use vox_config::Config;

/// Assembled server: the API router plus the static file router
pub struct Server {
    api_router: Router,
    file_router: Router,
    api_address: SocketAddr,
    file_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if voice subsystem initialization fails
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let api_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        let file_address = config
            .storage
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        let voice_state = voice::build_server(config)?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(
                &config.server.health.path,
                axum::routing::get(health::health_handler).with_state(config.provider.api_key_set()),
            );
        }

        // Voice relay routes
        app = app.merge(voice::endpoint_router().with_state(voice_state));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        let file_router = vox_files::router(config.storage.serve_dir.clone()).layer(TraceLayer::new_for_http());

        Ok(Self {
            api_router: app,
            file_router,
            api_address,
            file_address,
        })
    }

    /// Get the configured API listen address
    #[must_use]
    pub const fn api_address(&self) -> SocketAddr {
        self.api_address
    }

    /// Get the configured file-server listen address
    #[must_use]
    pub const fn file_address(&self) -> SocketAddr {
        self.file_address
    }

    /// Consume the server and return the inner routers
    ///
    /// Useful for testing when the caller manages the listeners
    pub fn into_routers(self) -> (Router, Router) {
        (self.api_router, self.file_router)
    }

    /// Start serving requests on both listeners
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding a TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let api_listener = tokio::net::TcpListener::bind(self.api_address).await?;
        tracing::info!(local_addr = %api_listener.local_addr()?, "api server listening");

        let file_listener = tokio::net::TcpListener::bind(self.file_address).await?;
        tracing::info!(local_addr = %file_listener.local_addr()?, "file server listening");

        let api_shutdown = shutdown.clone();
        let api = axum::serve(api_listener, self.api_router).with_graceful_shutdown(async move {
            api_shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        });

        let files = axum::serve(file_listener, self.file_router).with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        });

        let (api_result, files_result) = tokio::join!(api, files);
        api_result?;
        files_result?;

        Ok(())
    }
}
