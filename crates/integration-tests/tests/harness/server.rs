//! Test server wrapper that starts Vox on random ports

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use vox_config::Config;
use vox_server::Server;

/// A running test server instance (API and file listeners)
pub struct TestServer {
    api_addr: SocketAddr,
    file_addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds both listeners to port 0 for automatic assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(&config)?;
        let (api_router, file_router) = server.into_routers();

        let shutdown = CancellationToken::new();

        let api_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let api_addr = api_listener.local_addr()?;

        let file_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let file_addr = file_listener.local_addr()?;

        let api_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(api_listener, api_router)
                .with_graceful_shutdown(async move {
                    api_shutdown.cancelled().await;
                })
                .await
                .ok();
        });

        let file_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(file_listener, file_router)
                .with_graceful_shutdown(async move {
                    file_shutdown.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            api_addr,
            file_addr,
            shutdown,
            client,
        })
    }

    /// URL on the API listener
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.api_addr)
    }

    /// URL on the file listener
    pub fn file_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.file_addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
