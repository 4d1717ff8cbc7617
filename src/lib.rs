// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod resolver;
pub mod scoring;
pub mod target;
pub mod wsse;

// ---- Re-exports for stable public API ----
pub use crate::client::AtomPubClient;
pub use crate::config::ClientConfig;
pub use crate::error::{ResolveError, Result};
pub use crate::feed::{Entry, FeedPage, RawEntry};
pub use crate::resolver::Resolver;
pub use crate::scoring::Candidate;
pub use crate::target::SearchTarget;
