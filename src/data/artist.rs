//! Merged artist view model
//!
//! `ArtistComplete` combines a base `Artist` with whatever enrichment data
//! (locations, dates, location→dates relation) could be fetched for it.
//! Enrichment that failed is left unset and described in `warnings` instead
//! of failing the whole lookup.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{Artist, ArtistId, DatesRecord, LocationsRecord, Relation};

/// Which optional sub-resource an enrichment warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentSource {
    Locations,
    Dates,
    Relation,
}

impl fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnrichmentSource::Locations => "locations",
            EnrichmentSource::Dates => "dates",
            EnrichmentSource::Relation => "relation",
        };
        f.write_str(name)
    }
}

/// An enrichment fetch that failed and was downgraded to a missing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentWarning {
    pub source: EnrichmentSource,
    pub message: String,
}

/// An artist together with its tour data
///
/// Serializes with the artist fields flattened at the top level, matching
/// the shape downstream templates expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistComplete {
    #[serde(flatten)]
    pub artist: Artist,
    /// Tour locations, set only when the locations record was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations_list: Option<Vec<String>>,
    /// Concert dates, set only when the dates record was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates_list: Option<Vec<String>>,
    /// Location → dates, empty when no relation matched
    pub dates_locations: BTreeMap<String, Vec<String>>,
    /// Enrichment fetches that failed for this artist
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EnrichmentWarning>,
}

impl ArtistComplete {
    /// Wraps a bare artist with no enrichment attached
    pub fn new(artist: Artist) -> Self {
        Self {
            artist,
            locations_list: None,
            dates_list: None,
            dates_locations: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn id(&self) -> ArtistId {
        self.artist.id
    }

    pub fn with_locations(mut self, locations: LocationsRecord) -> Self {
        self.locations_list = Some(locations.locations);
        self
    }

    pub fn with_dates(mut self, dates: DatesRecord) -> Self {
        self.dates_list = Some(dates.dates);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.dates_locations = relation.dates_locations;
        self
    }

    /// Records a failed enrichment fetch
    pub fn push_warning(&mut self, source: EnrichmentSource, message: impl Into<String>) {
        self.warnings.push(EnrichmentWarning {
            source,
            message: message.into(),
        });
    }

    /// True when at least one enrichment fetch failed
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Attaches each artist's relation by id
///
/// Output order follows `artists`. Artists with no matching relation get an
/// empty location → dates mapping. Relations for unknown ids are ignored;
/// if the index repeats an id the last record wins.
pub fn join_relations(artists: Vec<Artist>, relations: Vec<Relation>) -> Vec<ArtistComplete> {
    let mut by_id: HashMap<ArtistId, Relation> = relations
        .into_iter()
        .map(|relation| (relation.id, relation))
        .collect();

    artists
        .into_iter()
        .map(|artist| {
            let relation = by_id.remove(&artist.id);
            let complete = ArtistComplete::new(artist);
            match relation {
                Some(relation) => complete.with_relation(relation),
                None => complete,
            }
        })
        .collect()
}
