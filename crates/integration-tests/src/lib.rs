//! Integration tests for TechMart.
//!
//! Each test starts the full storefront router on an ephemeral local port and
//! talks to it over HTTP with `reqwest`, so sessions, middleware and templates
//! run exactly as they do in production. No external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techmart-integration-tests
//! ```
//!
//! A [`TestServer`]'s client keeps cookies like a browser would, so a sequence
//! of calls acts on one visitor's cart. Clones of [`TestServer::client`] share
//! that cookie jar, which is how concurrent requests from one visitor are sent.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode, header::HeaderMap, redirect};
use tokio::net::TcpListener;

use techmart_core::Catalog;
use techmart_storefront::config::StorefrontConfig;
use techmart_storefront::state::AppState;

/// A response with its body already collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    async fn collect(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.expect("Failed to read response body");
        Self {
            status,
            headers,
            body,
        }
    }

    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// The value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A storefront served on a local port, plus one visitor's client.
pub struct TestServer {
    addr: SocketAddr,
    client: Client,
}

impl TestServer {
    /// Serve the demo catalog.
    pub async fn spawn() -> Self {
        Self::spawn_with_catalog(Catalog::demo()).await
    }

    /// Serve a specific catalog.
    pub async fn spawn_with_catalog(catalog: Catalog) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");

        let app = techmart_storefront::app(AppState::new(StorefrontConfig::default(), catalog));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            addr,
            client: visitor_client(),
        }
    }

    /// A second visitor with an empty cookie jar, on the same server.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            addr: self.addr,
            client: visitor_client(),
        }
    }

    /// This visitor's client. Clones share its cookies.
    #[must_use]
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::collect(response).await
    }

    /// Send a form POST as a plain browser would.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::collect(response).await
    }

    /// Send a form POST as the fragment-swapping script does.
    pub async fn post_fragment(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let response = self
            .client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::collect(response).await
    }

    /// Fetch the cart summary JSON.
    pub async fn summary(&self) -> serde_json::Value {
        let response = self.get("/cart/summary").await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()
    }
}

/// A client that keeps cookies and reports redirects instead of following them.
fn visitor_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
