// src/wsse.rs
//! WSSE `UsernameToken` credential for the `X-WSSE` header.
//!
//! A credential is single-use: every outbound request gets a fresh nonce and
//! `Created` timestamp. Nothing here caches a header value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use rand::RngCore;
use sha1::{Digest, Sha1};
use std::sync::Arc;

pub const NONCE_LEN: usize = 20;
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Source of nonce bytes. Production uses the thread-local CSPRNG; tests may pin bytes.
pub trait NonceSource: Send + Sync {
    fn nonce(&self) -> [u8; NONCE_LEN];
}

/// OS-seeded ChaCha CSPRNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngNonce;

impl NonceSource for ThreadRngNonce {
    fn nonce(&self) -> [u8; NONCE_LEN] {
        let mut buf = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut buf);
        buf
    }
}

/// Always returns the same bytes. Test use only.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub [u8; NONCE_LEN]);

impl NonceSource for FixedNonce {
    fn nonce(&self) -> [u8; NONCE_LEN] {
        self.0
    }
}

/// One generated credential; `digest` and `nonce_b64` are already base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub nonce_b64: String,
    pub created: String,
    pub digest: String,
}

impl Credential {
    pub fn new(nonce: &[u8], created: &str, secret: &str) -> Self {
        Self {
            nonce_b64: STANDARD.encode(nonce),
            created: created.to_string(),
            digest: password_digest(nonce, created, secret),
        }
    }

    pub fn header_value(&self, identity: &str) -> String {
        format!(
            r#"UsernameToken Username="{}", PasswordDigest="{}", Nonce="{}", Created="{}""#,
            identity, self.digest, self.nonce_b64, self.created
        )
    }
}

/// `base64(SHA1(nonce ∥ created ∥ secret))` over raw bytes.
pub fn password_digest(nonce: &[u8], created: &str, secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(secret.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Deterministic header construction from explicit inputs.
pub fn sign_with(identity: &str, secret: &str, nonce: &[u8], created: &str) -> String {
    Credential::new(nonce, created, secret).header_value(identity)
}

#[derive(Clone)]
pub struct WsseSigner {
    nonce_source: Arc<dyn NonceSource>,
}

impl Default for WsseSigner {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngNonce))
    }
}

impl WsseSigner {
    pub fn new(nonce_source: Arc<dyn NonceSource>) -> Self {
        Self { nonce_source }
    }

    /// Fresh header value; call once per request.
    pub fn sign(&self, identity: &str, secret: &str) -> String {
        let nonce = self.nonce_source.nonce();
        let created = Utc::now().format(CREATED_FORMAT).to_string();
        sign_with(identity, secret, &nonce, &created)
    }
}
