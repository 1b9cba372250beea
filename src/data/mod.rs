//! Core data models for the Groupie Tracker API
//!
//! This module contains the record shapes returned by the upstream API
//! (artists, locations, dates, relations) and the merged view model built
//! from them.

pub mod artist;
pub mod client;

pub use artist::{join_relations, ArtistComplete, EnrichmentSource, EnrichmentWarning};
pub use client::{ApiError, GroupieClient};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Numeric identity shared by an artist and all of its sub-records
pub type ArtistId = u32;

/// An artist or band as listed by `/artists`
///
/// Only `id` is required on the wire; everything else falls back to an
/// empty value so partially populated records still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Unique identifier, also the key of the artist's sub-records
    pub id: ArtistId,
    /// URL of the artist's picture
    #[serde(default)]
    pub image: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Member names in upstream order
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
    /// Year the band was formed
    #[serde(default)]
    pub creation_date: i32,
    /// Release date of the first album, as the upstream string (`dd-mm-yyyy`)
    #[serde(default)]
    pub first_album: String,
    /// URL of this artist's `/locations/<id>` record
    #[serde(default)]
    pub locations: String,
    /// URL of this artist's `/dates/<id>` record
    #[serde(default)]
    pub concert_dates: String,
    /// URL of this artist's `/relation/<id>` record
    #[serde(default)]
    pub relations: String,
}

/// Tour locations of one artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsRecord {
    pub id: ArtistId,
    /// Location strings such as `london-uk`
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    /// URL of the matching dates record
    #[serde(default, rename = "dates")]
    pub dates_url: String,
}

/// Concert dates of one artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatesRecord {
    pub id: ArtistId,
    /// Date strings; upstream prefixes some of them with `*`
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates: Vec<String>,
}

/// Mapping from each concert location to its dates for one artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: ArtistId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates_locations: BTreeMap<String, Vec<String>>,
}

/// Wrapper used by the bulk `/locations`, `/dates` and `/relation` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index<T> {
    pub index: Vec<T>,
}

/// Upstream serializes empty lists and maps as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub type LocationsIndex = Index<LocationsRecord>;
pub type DatesIndex = Index<DatesRecord>;
pub type RelationIndex = Index<Relation>;
