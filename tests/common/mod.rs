//! Shared utilities for integration tests.

use std::sync::Arc;
use std::time::Duration;

use subscription_tracker::config::HttpServerConfig;
use subscription_tracker::http::HttpServer;
use subscription_tracker::lifecycle::Shutdown;
use subscription_tracker::service::SubscriptionService;
use subscription_tracker::storage::MemoryStore;
use subscriptions_sdk::SubscriptionsClient;
use tokio::net::TcpListener;

/// A running server backed by an in-memory store.
pub struct TestServer {
    pub client: SubscriptionsClient,
    pub base_url: String,
    shutdown: Shutdown,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the API on an ephemeral port.
pub async fn start_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = HttpServerConfig {
        bind_address: addr.to_string(),
        shutdown_timeout_secs: 1,
        ..HttpServerConfig::default()
    };
    let service = SubscriptionService::new(Arc::new(MemoryStore::new()));
    let server = HttpServer::new(config, service);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let base_url = format!("http://{addr}");
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestServer {
        client: SubscriptionsClient::with_client(http, &base_url),
        base_url,
        shutdown,
    }
}

/// A valid create body for `user_id`.
#[allow(dead_code)]
pub fn subscription(
    user_id: &str,
    service_name: &str,
    price: i64,
    start_date: &str,
) -> subscriptions_sdk::CreateSubscription {
    subscriptions_sdk::CreateSubscription {
        service_name: service_name.to_string(),
        price,
        user_id: user_id.to_string(),
        start_date: start_date.to_string(),
        end_date: None,
    }
}
