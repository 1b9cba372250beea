//! Command-line interface for the Groupie Tracker client
//!
//! This module handles parsing of CLI arguments using clap, turning them into
//! a `ClientConfig`, and running one retrieval command whose result is
//! rendered as pretty-printed JSON.

use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::data::{ApiError, ArtistId, GroupieClient};

/// Error types for the command-line front end
#[derive(Debug, Error)]
pub enum CliError {
    /// The API root is not an absolute http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an absolute http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// A zero request timeout would fail every request
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    /// The upstream API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The result could not be rendered as JSON
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Groupie Tracker - inspect artists, concert locations and dates
#[derive(Parser, Debug)]
#[command(name = "groupie-tracker")]
#[command(about = "Fetch artists and their concerts from the Groupie Tracker API")]
#[command(version)]
pub struct Cli {
    /// Root of the Groupie Tracker API
    #[arg(long, env = "GROUPIE_API_URL", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// How long responses are served from the cache, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// What to fetch
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every artist joined with its concert relation
    Artists,
    /// Show one artist with its locations, dates and relation
    Artist {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: ArtistId,
    },
    /// Show the locations index, or one artist's locations
    Locations {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: Option<ArtistId>,
    },
    /// Show the dates index, or one artist's concert dates
    Dates {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: Option<ArtistId>,
    },
    /// Show the relation index, or one artist's location to dates mapping
    Relations {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: Option<ArtistId>,
    },
}

/// Validates an API root argument
///
/// # Returns
/// * `Ok(String)` with any trailing slash removed
/// * `Err(CliError::InvalidBaseUrl)` if the string is not an http(s) URL
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let url = Url::parse(s).map_err(|_| CliError::InvalidBaseUrl(s.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(s.trim_end_matches('/').to_string()),
        _ => Err(CliError::InvalidBaseUrl(s.to_string())),
    }
}

impl Cli {
    /// Builds the client configuration from parsed arguments
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        if self.timeout_secs == 0 {
            return Err(CliError::InvalidTimeout);
        }
        let base_url = parse_base_url(&self.base_url)?;

        Ok(ClientConfig::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs)))
    }
}

/// Runs `command` against `client` and renders the result as pretty JSON
pub async fn run_command(client: &GroupieClient, command: &Command) -> Result<String, CliError> {
    match *command {
        Command::Artists => pretty(&client.get_all_artists_complete().await?),
        Command::Artist { id } => pretty(&client.get_artist_complete(id).await?),
        Command::Locations { id: None } => pretty(&client.get_locations().await?),
        Command::Locations { id: Some(id) } => pretty(&client.get_locations_by_artist_id(id).await?),
        Command::Dates { id: None } => pretty(&client.get_dates().await?),
        Command::Dates { id: Some(id) } => pretty(&client.get_dates_by_artist_id(id).await?),
        Command::Relations { id: None } => pretty(&client.get_relations().await?),
        Command::Relations { id: Some(id) } => pretty(&client.get_relation_by_artist_id(id).await?),
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_accepts_http_and_https() {
        assert_eq!(
            parse_base_url("https://groupietrackers.herokuapp.com/api").unwrap(),
            "https://groupietrackers.herokuapp.com/api"
        );
        assert_eq!(
            parse_base_url("http://localhost:8080/api/").unwrap(),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_parse_base_url_invalid() {
        let result = parse_base_url("not a url");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid base URL"));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://example.com/api").is_err());
        assert!(parse_base_url("file:///tmp/api").is_err());
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["groupie-tracker", "artists"]);
        assert_eq!(cli.timeout_secs, 10);
        assert_eq!(cli.cache_ttl_secs, 300);
        assert_eq!(cli.command, Command::Artists);
    }

    #[test]
    fn test_cli_parse_artist_id() {
        let cli = Cli::parse_from(["groupie-tracker", "artist", "7"]);
        assert_eq!(cli.command, Command::Artist { id: 7 });
    }

    #[test]
    fn test_cli_rejects_zero_id() {
        let result = Cli::try_parse_from(["groupie-tracker", "artist", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_id() {
        let result = Cli::try_parse_from(["groupie-tracker", "relations", "queen"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_optional_id_commands() {
        let cli = Cli::parse_from(["groupie-tracker", "locations"]);
        assert_eq!(cli.command, Command::Locations { id: None });

        let cli = Cli::parse_from(["groupie-tracker", "dates", "3"]);
        assert_eq!(cli.command, Command::Dates { id: Some(3) });
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["groupie-tracker"]).is_err());
    }

    #[test]
    fn test_client_config_from_cli() {
        let cli = Cli::parse_from([
            "groupie-tracker",
            "--base-url",
            "http://localhost:9000/api/",
            "--timeout-secs",
            "3",
            "--cache-ttl-secs",
            "0",
            "artists",
        ]);
        let config = cli.client_config().unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_client_config_rejects_zero_timeout() {
        let cli = Cli::parse_from(["groupie-tracker", "--timeout-secs", "0", "artists"]);
        assert!(matches!(cli.client_config(), Err(CliError::InvalidTimeout)));
    }

    #[test]
    fn test_client_config_rejects_bad_base_url() {
        let cli = Cli::parse_from(["groupie-tracker", "--base-url", "nope", "artists"]);
        assert!(matches!(
            cli.client_config(),
            Err(CliError::InvalidBaseUrl(url)) if url == "nope"
        ));
    }
}
