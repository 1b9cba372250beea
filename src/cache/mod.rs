//! In-memory cache for raw upstream responses
//!
//! Responses are keyed by the exact request URL and expire lazily: an entry
//! older than the configured TTL is simply ignored on read and overwritten by
//! the next successful fetch. There is no background sweep.

mod manager;

pub use manager::{CachedResponse, ResponseCache};
