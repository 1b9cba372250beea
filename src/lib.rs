//! Groupie Tracker API client library
//!
//! Fetches artists, tour locations, concert dates and location/date relations
//! from the Groupie Tracker JSON API through a URL-keyed response cache, and
//! merges them into `ArtistComplete` view models for a rendering layer.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;

pub use config::ClientConfig;
pub use data::{ApiError, ArtistComplete, GroupieClient};
