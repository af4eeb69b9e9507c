#![allow(dead_code)]

use std::net::{Ipv4Addr, TcpListener};

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::any;
use declapi_core::{ApiClient, ApiClientBuilder};
use rstest::fixture;
use serde::{Deserialize, Serialize};
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// What the echo server received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Echo {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Local HTTP server answering every request with an [`Echo`] of it.
///
/// - `/status/{code}` answers with that status code and a short text
/// - `/text` answers a body that is not JSON
#[derive(Debug, Clone)]
pub struct EchoServer {
    base_url: String,
}

impl EchoServer {
    pub fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        std::thread::spawn(move || {
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)?;
                axum::serve(listener, router()).await
            })
        });

        let base_url = format!("http://{addr}");
        info!(%base_url, "echo server started");
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_builder(&self) -> ApiClientBuilder {
        ApiClient::builder().with_base_url(&self.base_url)
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let client = self.client_builder().build()?;
        Ok(client)
    }
}

fn router() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/text", any(|| async { "plain text, not json" }))
        .fallback(echo)
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), value)
        })
        .collect();

    Json(Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        headers,
        body: body.to_vec(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {code}"))
}

#[fixture]
pub fn server() -> EchoServer {
    init_tracing();
    match EchoServer::start() {
        Ok(server) => server,
        Err(error) => {
            panic!("fail to start echo server: {error:?}");
        }
    }
}
