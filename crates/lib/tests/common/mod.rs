//! Shared helpers: serve an axum router on a free local port, record retry sleeps.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use zerochat::config::HttpConfig;
use zerochat::http::Sleeper;

/// Bind 127.0.0.1:0, serve `app` in the background, return the bound address.
/// The server task is left running when the test ends.
pub async fn serve(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A port nothing listens on: bind, read the port, drop the listener.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

pub fn http_config(retries: u32) -> HttpConfig {
    HttpConfig {
        retries,
        timeout_ms: 2_000,
        ..HttpConfig::default()
    }
}

/// Records requested backoffs instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
