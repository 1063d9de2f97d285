//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases.

use super::constants::*;
use super::fixtures::create_test_dbs_with_users;
use artistry_hub_server::postal::{NoOpPostalLookup, PostalLookup, PostalPlace};
use artistry_hub_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use artistry_hub_server::social::{SocialStore, SqliteSocialStore};
use artistry_hub_server::user::{FullUserStore, SqliteUserStore, UserManager};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Postal lookup stub returning a fixed place for every code
struct MockPostalLookup;

#[async_trait]
impl PostalLookup for MockPostalLookup {
    async fn lookup(&self, _postal_code: &str) -> anyhow::Result<Option<PostalPlace>> {
        Ok(Some(PostalPlace {
            district: "Bangalore".to_string(),
            state: "Karnataka".to_string(),
            country: "India".to_string(),
        }))
    }
}

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// User store for direct database access in tests
    pub user_store: Arc<dyn FullUserStore>,

    /// Social store for direct database access in tests
    pub social_store: Arc<dyn SocialStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with the stub postal lookup
    pub async fn spawn() -> Self {
        Self::spawn_with_postal(Arc::new(MockPostalLookup)).await
    }

    /// Spawns a new test server whose postal lookups always miss
    pub async fn spawn_without_postal() -> Self {
        Self::spawn_with_postal(Arc::new(NoOpPostalLookup)).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates temporary databases with test users
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Database creation fails
    /// - Port binding fails
    /// - Server fails to start
    /// - Server doesn't become ready within timeout
    pub async fn spawn_with_postal(postal: Arc<dyn PostalLookup>) -> Self {
        let (temp_db_dir, user_db_path, social_db_path) =
            create_test_dbs_with_users().expect("Failed to create test databases");

        let user_store: Arc<dyn FullUserStore> =
            Arc::new(SqliteUserStore::new(&user_db_path).expect("Failed to open user store"));
        let user_store_for_test = user_store.clone();

        let social_store: Arc<dyn SocialStore> = Arc::new(
            SqliteSocialStore::new(&social_db_path).expect("Failed to open social store"),
        );
        let social_store_for_test = social_store.clone();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            feed_page_size: 50,
        };

        let user_manager = Arc::new(Mutex::new(UserManager::new(user_store.clone())));

        let app = make_app(config, user_store, user_manager, social_store, postal)
            .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url: base_url.clone(),
            port,
            user_store: user_store_for_test,
            social_store: social_store_for_test,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
