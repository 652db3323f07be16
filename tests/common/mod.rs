//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as TokenTtl;
use request_pipeline::auth::{InMemoryDirectory, TokenVerifier, UserDirectory};
use request_pipeline::config::{AppConfig, UserSeed};
use request_pipeline::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const SECRET: &str = "integration-test-secret";
pub const USER_ID: &str = "usr_integration";

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.jwt.secret = SECRET.to_string();
    config.users = vec![UserSeed {
        public_id: USER_ID.to_string(),
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        activated: true,
    }];
    config
}

#[allow(dead_code)]
pub async fn spawn_server(config: AppConfig) -> TestServer {
    let directory = Arc::new(InMemoryDirectory::from_seeds(config.users.clone()));
    spawn_server_with(config, directory).await
}

/// Start a server backed by a custom user directory.
pub async fn spawn_server_with(config: AppConfig, directory: Arc<dyn UserDirectory>) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, directory);
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn token_for(subject: &str) -> String {
    TokenVerifier::new(SECRET.as_bytes())
        .issue(subject, TokenTtl::hours(1))
        .unwrap()
}
