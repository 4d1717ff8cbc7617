// src/client.rs
//! Signed AtomPub client: collection pages for the resolver, member entries by id.

use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ResolveError, Result};
use crate::feed::{atom, Entry, EntryFetcher, FeedPage, PageSource};
use crate::http::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::wsse::WsseSigner;

pub const ATOM_MEDIA_TYPE: &str = "application/atom+xml";
pub const WSSE_HEADER: &str = "X-WSSE";

pub struct AtomPubClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
    signer: WsseSigner,
}

impl AtomPubClient {
    /// Production client backed by `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = ReqwestHttpClient::new(config.timeout())?;
        Self::with_http(config, Arc::new(http))
    }

    /// The secret is validated here, once, before any request can be issued.
    pub fn with_http(config: ClientConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self {
            config: config.validated()?,
            http,
            signer: WsseSigner::default(),
        })
    }

    pub fn with_signer(mut self, signer: WsseSigner) -> Self {
        self.signer = signer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A fresh `X-WSSE` header value for this client's identity.
    pub fn credential_header(&self) -> String {
        self.signer.sign(&self.config.identity, &self.config.secret)
    }

    pub fn entry_url(&self, entry_id: &str) -> String {
        format!("{}/{}", self.config.endpoint, entry_id)
    }

    async fn get_atom(&self, url: &str) -> Result<String> {
        let req = HttpRequest::get(url)
            .with_header(WSSE_HEADER, self.credential_header())
            .with_header("Accept", ATOM_MEDIA_TYPE);

        debug!(target: "atompub", %url, "GET");
        counter!("atompub_requests_total").increment(1);

        let rsp = self.http.request(req).await?;
        if !rsp.is_success() {
            warn!(target: "atompub", %url, status = rsp.status, "non-success response");
            counter!("atompub_request_errors_total").increment(1);
            return Err(ResolveError::RemoteRequest {
                status: rsp.status,
                body: rsp.body,
            });
        }
        Ok(rsp.body)
    }
}

#[async_trait]
impl PageSource for AtomPubClient {
    async fn fetch_first_page(&self) -> Result<FeedPage> {
        let body = self.get_atom(&self.config.endpoint).await?;
        atom::parse_feed(&body)
    }

    async fn fetch_page(&self, url: &str) -> Result<FeedPage> {
        let body = self.get_atom(url).await?;
        atom::parse_feed(&body)
    }
}

#[async_trait]
impl EntryFetcher for AtomPubClient {
    async fn fetch(&self, entry_id: &str) -> Result<Entry> {
        let body = self.get_atom(&self.entry_url(entry_id)).await?;
        atom::parse_entry(&body)
    }
}
