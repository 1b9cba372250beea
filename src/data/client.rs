//! Groupie Tracker API client
//!
//! This module provides `GroupieClient`, which fetches artists, locations,
//! dates and relations from the upstream JSON API through an in-memory
//! response cache, and assembles them into `ArtistComplete` view models.

use futures::{join, try_join};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::artist::{join_relations, ArtistComplete, EnrichmentSource};
use super::{
    Artist, ArtistId, DatesIndex, DatesRecord, LocationsIndex, LocationsRecord, Relation,
    RelationIndex,
};
use crate::cache::ResponseCache;
use crate::config::ClientConfig;

/// Path of the artist resource below the API root
const ARTISTS_RESOURCE: &str = "artists";

/// Path of the locations resource below the API root
const LOCATIONS_RESOURCE: &str = "locations";

/// Path of the concert dates resource below the API root
const DATES_RESOURCE: &str = "dates";

/// Path of the relation resource below the API root
const RELATION_RESOURCE: &str = "relation";

/// Errors that can occur when talking to the upstream API
///
/// Transport, status, body and decode failures are kept apart so callers can
/// tell an unreachable API from a malformed response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout)
    #[error("HTTP request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    /// Upstream answered with a non-success status code
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// The response body could not be read to the end
    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    /// The body was not the JSON shape we expected
    #[error("Failed to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// Upstream answered but returned a record for a different (or zero) id
    #[error("No {resource} record with id {id}")]
    NotFound {
        resource: &'static str,
        id: ArtistId,
    },
}

impl ApiError {
    /// The request URL this error relates to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            ApiError::Request { url, .. }
            | ApiError::Status { url, .. }
            | ApiError::Body { url, .. }
            | ApiError::Decode { url, .. } => Some(url.as_str()),
            ApiError::ClientBuild(_) | ApiError::NotFound { .. } => None,
        }
    }

    /// The upstream status code for `Status` errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error means the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
            || self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Whether the request was aborted by the client timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            ApiError::Request { source, .. } | ApiError::Body { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Cache-fronted client for the Groupie Tracker API
///
/// Cloning is cheap and clones share the same response cache, so one client
/// can be handed to every request handler of a web server.
#[derive(Debug, Clone)]
pub struct GroupieClient {
    /// HTTP client carrying the request timeout
    http_client: Client,
    /// Responses keyed by request URL
    cache: Arc<ResponseCache>,
    /// API root without trailing slash
    base_url: String,
}

impl GroupieClient {
    /// Creates a client for the public API with default timeout and TTL
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client from an explicit configuration
    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http_client,
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Number of responses currently held in the cache
    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    /// URL of a bulk endpoint, e.g. `<base>/artists`
    fn index_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// URL of a single record, e.g. `<base>/artists/3`
    fn record_url(&self, resource: &str, id: ArtistId) -> String {
        format!("{}/{}/{}", self.base_url, resource, id)
    }

    /// Fetches the raw body for `url`, serving it from the cache when fresh
    ///
    /// On a miss the body is requested once (no retry) and stored only if
    /// the status is a success and the body was read completely. The cache
    /// lock is not held while the request is in flight, so concurrent misses
    /// for the same URL each fetch and the last one to finish wins.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        if let Some(hit) = self.cache.get(url).await {
            debug!(url, cached_at = %hit.cached_at, "cache hit");
            return Ok(hit.body);
        }

        info!(url, "requesting upstream");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Body {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        self.cache.insert(url, body.clone()).await;
        Ok(body)
    }

    /// Fetches `url` and decodes the body as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches the full artist list
    pub async fn get_artists(&self) -> Result<Vec<Artist>, ApiError> {
        let artists: Vec<Artist> = self.get_json(&self.index_url(ARTISTS_RESOURCE)).await?;
        info!(count = artists.len(), "fetched artists");
        Ok(artists)
    }

    /// Fetches a single artist
    ///
    /// Upstream answers unknown ids with an empty record rather than a 404,
    /// so a record whose id does not match is reported as `NotFound`.
    pub async fn get_artist_by_id(&self, id: ArtistId) -> Result<Artist, ApiError> {
        let artist: Artist = self.get_json(&self.record_url(ARTISTS_RESOURCE, id)).await?;
        require_id(ARTISTS_RESOURCE, id, artist.id, artist)
    }

    pub async fn get_locations(&self) -> Result<LocationsIndex, ApiError> {
        let locations: LocationsIndex = self.get_json(&self.index_url(LOCATIONS_RESOURCE)).await?;
        info!(count = locations.index.len(), "fetched locations");
        Ok(locations)
    }

    pub async fn get_locations_by_artist_id(
        &self,
        id: ArtistId,
    ) -> Result<LocationsRecord, ApiError> {
        self.get_json(&self.record_url(LOCATIONS_RESOURCE, id)).await
    }

    pub async fn get_dates(&self) -> Result<DatesIndex, ApiError> {
        let dates: DatesIndex = self.get_json(&self.index_url(DATES_RESOURCE)).await?;
        info!(count = dates.index.len(), "fetched dates");
        Ok(dates)
    }

    pub async fn get_dates_by_artist_id(&self, id: ArtistId) -> Result<DatesRecord, ApiError> {
        self.get_json(&self.record_url(DATES_RESOURCE, id)).await
    }

    pub async fn get_relations(&self) -> Result<RelationIndex, ApiError> {
        let relations: RelationIndex = self.get_json(&self.index_url(RELATION_RESOURCE)).await?;
        info!(count = relations.index.len(), "fetched relations");
        Ok(relations)
    }

    pub async fn get_relation_by_artist_id(&self, id: ArtistId) -> Result<Relation, ApiError> {
        self.get_json(&self.record_url(RELATION_RESOURCE, id)).await
    }

    /// Fetches one artist with its locations, dates and relation
    ///
    /// The artist record is mandatory and its failure is returned as-is. The
    /// three enrichment records are fetched concurrently; each one that
    /// fails, or that belongs to a different id, leaves its field unset and
    /// adds a warning to the result.
    pub async fn get_artist_complete(&self, id: ArtistId) -> Result<ArtistComplete, ApiError> {
        let artist = self.get_artist_by_id(id).await?;

        let (locations, dates, relation) = join!(
            self.get_locations_by_artist_id(id),
            self.get_dates_by_artist_id(id),
            self.get_relation_by_artist_id(id)
        );
        let locations = locations.and_then(|r| require_id(LOCATIONS_RESOURCE, id, r.id, r));
        let dates = dates.and_then(|r| require_id(DATES_RESOURCE, id, r.id, r));
        let relation = relation.and_then(|r| require_id(RELATION_RESOURCE, id, r.id, r));

        let mut complete = ArtistComplete::new(artist);
        if let Some(locations) = downgrade(&mut complete, EnrichmentSource::Locations, locations) {
            complete = complete.with_locations(locations);
        }
        if let Some(dates) = downgrade(&mut complete, EnrichmentSource::Dates, dates) {
            complete = complete.with_dates(dates);
        }
        if let Some(relation) = downgrade(&mut complete, EnrichmentSource::Relation, relation) {
            complete = complete.with_relation(relation);
        }

        Ok(complete)
    }

    /// Fetches every artist joined with its relation
    ///
    /// Issues exactly two upstream requests (artist index and relation
    /// index) regardless of how many artists there are. Locations and dates
    /// lists are not attached.
    pub async fn get_all_artists_complete(&self) -> Result<Vec<ArtistComplete>, ApiError> {
        let (artists, relations) = try_join!(self.get_artists(), self.get_relations())?;
        Ok(join_relations(artists, relations.index))
    }

    /// Drops every cached response
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("API cache cleared");
    }
}

/// Rejects a record whose id is not the one that was requested
fn require_id<T>(
    resource: &'static str,
    requested: ArtistId,
    found: ArtistId,
    record: T,
) -> Result<T, ApiError> {
    if found != requested {
        return Err(ApiError::NotFound {
            resource,
            id: requested,
        });
    }
    Ok(record)
}

/// Turns a failed enrichment fetch into a warning on `complete`
fn downgrade<T>(
    complete: &mut ArtistComplete,
    source: EnrichmentSource,
    result: Result<T, ApiError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                artist_id = complete.id(),
                %source,
                error = %err,
                "enrichment fetch failed, leaving field unset"
            );
            complete.push_warning(source, err.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> GroupieClient {
        let config = ClientConfig::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(2));
        GroupieClient::with_config(config).expect("Client should build")
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client_for("https://groupietrackers.herokuapp.com/api/");

        assert_eq!(client.base_url(), "https://groupietrackers.herokuapp.com/api");
        assert_eq!(
            client.index_url(ARTISTS_RESOURCE),
            "https://groupietrackers.herokuapp.com/api/artists"
        );
        assert_eq!(
            client.record_url(RELATION_RESOURCE, 42),
            "https://groupietrackers.herokuapp.com/api/relation/42"
        );
        assert_eq!(
            client.record_url(DATES_RESOURCE, 1),
            "https://groupietrackers.herokuapp.com/api/dates/1"
        );
    }

    #[test]
    fn test_default_client_uses_five_minute_ttl() {
        let client = GroupieClient::new().expect("Client should build");
        assert_eq!(client.cache_ttl(), Duration::from_secs(300));
        assert_eq!(client.base_url(), "https://groupietrackers.herokuapp.com/api");
    }

    #[test]
    fn test_status_error_accessors() {
        let err = ApiError::Status {
            url: "http://localhost/api/artists/9".to_string(),
            status: StatusCode::NOT_FOUND,
        };

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.url(), Some("http://localhost/api/artists/9"));
        assert!(err.is_not_found());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_not_found_error() {
        let err = ApiError::NotFound {
            resource: ARTISTS_RESOURCE,
            id: 9,
        };

        assert!(err.is_not_found());
        assert!(err.url().is_none());
        assert!(err.status().is_none());
        assert_eq!(err.to_string(), "No artists record with id 9");
    }

    #[test]
    fn test_decode_error_is_not_a_status_error() {
        let source = serde_json::from_slice::<Artist>(b"not json").unwrap_err();
        let err = ApiError::Decode {
            url: "http://localhost/api/artists/1".to_string(),
            source,
        };

        assert!(err.status().is_none());
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("Failed to parse JSON response"));
    }

    #[test]
    fn test_downgrade_records_warning() {
        let mut complete = ArtistComplete::new(Artist {
            id: 3,
            ..Default::default()
        });
        let failed: Result<DatesRecord, ApiError> = Err(ApiError::Status {
            url: "http://localhost/api/dates/3".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        });

        let value = downgrade(&mut complete, EnrichmentSource::Dates, failed);

        assert!(value.is_none());
        assert_eq!(complete.warnings.len(), 1);
        assert_eq!(complete.warnings[0].source, EnrichmentSource::Dates);
        assert!(complete.warnings[0].message.contains("500"));
    }

    #[test]
    fn test_require_id_rejects_mismatched_record() {
        let err = require_id(DATES_RESOURCE, 5, 0, DatesRecord::default()).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { resource: "dates", id: 5 }));

        let record = DatesRecord {
            id: 5,
            dates: vec!["01-01-2020".to_string()],
        };
        assert_eq!(require_id(DATES_RESOURCE, 5, 5, record.clone()).unwrap(), record);
    }

    #[test]
    fn test_downgrade_passes_success_through() {
        let mut complete = ArtistComplete::new(Artist::default());
        let ok: Result<u32, ApiError> = Ok(7);

        assert_eq!(downgrade(&mut complete, EnrichmentSource::Locations, ok), Some(7));
        assert!(complete.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_request_error_and_not_cached() {
        // Nothing listens on the discard port of the loopback interface
        let client = client_for("http://127.0.0.1:9/api");

        let err = client.get_artists().await.unwrap_err();

        assert!(matches!(err, ApiError::Request { .. }), "got {:?}", err);
        assert_eq!(err.url(), Some("http://127.0.0.1:9/api/artists"));
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_cache() {
        let client = client_for("http://127.0.0.1:9/api");
        let clone = client.clone();

        client.cache.insert("http://127.0.0.1:9/api/artists", b"[]".to_vec()).await;

        let artists = clone.get_artists().await.expect("Should be served from cache");
        assert!(artists.is_empty());

        clone.clear_cache().await;
        assert_eq!(client.cache_len().await, 0);
    }
}
