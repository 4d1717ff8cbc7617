// src/feed/mod.rs
pub mod atom;
pub mod types;

pub use types::{entry_id_from_tag, Entry, EntryFetcher, FeedPage, PageSource, RawEntry};
