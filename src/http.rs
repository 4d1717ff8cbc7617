// src/http.rs
//! Minimal HTTP transport seam. Status handling belongs to the caller;
//! implementations only fail when no response was received at all.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ResolveError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// `Err` only for transport failures; any received status is `Ok`.
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport on top of `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("entry-resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResolveError::Configuration(format!("building http client: {e}")))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
        };

        let mut builder = self
            .client
            .request(method, &req.url)
            .timeout(self.timeout);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let rsp = builder.send().await.map_err(|e| {
            tracing::warn!(target: "http", error = ?e, method = req.method.as_str(), "request failed");
            ResolveError::Transport(e.to_string())
        })?;
        let status = rsp.status().as_u16();
        let body = rsp
            .text()
            .await
            .map_err(|e| ResolveError::Transport(format!("reading response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
