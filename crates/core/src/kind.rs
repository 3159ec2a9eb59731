use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/data/cache/";

/// The four caches published under the aviationweather.gov cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataKind {
  Metar,
  Taf,
  Airsigmet,
  Stations,
}

impl DataKind {
  /// processing order when several kinds are requested
  pub const ALL: [DataKind; 4] = [Self::Metar, Self::Taf, Self::Airsigmet, Self::Stations];

  pub fn name(&self) -> &'static str {
    match self {
      Self::Metar => "metar",
      Self::Taf => "taf",
      Self::Airsigmet => "airsigmet",
      Self::Stations => "stations",
    }
  }

  /// file name on the remote side, relative to the base url
  pub fn remote_name(&self) -> &'static str {
    match self {
      Self::Metar => "metars.cache.csv.gz",
      Self::Taf => "tafs.cache.csv.gz",
      Self::Airsigmet => "airsigmets.cache.csv.gz",
      Self::Stations => "stations.cache.json.gz",
    }
  }

  /// decompressed file name before the timestamp is inserted
  pub fn base_name(&self) -> &'static str {
    match self {
      Self::Metar => "metars.csv",
      Self::Taf => "tafs.csv",
      Self::Airsigmet => "airsigmets.csv",
      Self::Stations => "stations.json",
    }
  }

  pub fn url(&self, base: &Url) -> Result<Url> {
    base.join(self.remote_name()).map_err(|_| Error::MalformedUrl(format!("{}{}", base, self.remote_name())))
  }
}

impl std::fmt::Display for DataKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// Parse a base url, making sure it ends with `/` so that `Url::join` appends instead of replacing the last segment.
pub fn parse_base_url(s: &str) -> Result<Url> {
  let s = if s.ends_with('/') { s.to_string() } else { format!("{}/", s) };
  Url::parse(&s).map_err(|_| Error::MalformedUrl(s))
}

#[test]
fn test_kind_urls() {
  let base = parse_base_url(DEFAULT_BASE_URL).unwrap();
  assert_eq!(DataKind::Metar.url(&base).unwrap().as_str(), "https://aviationweather.gov/data/cache/metars.cache.csv.gz");
  assert_eq!(DataKind::Taf.url(&base).unwrap().as_str(), "https://aviationweather.gov/data/cache/tafs.cache.csv.gz");
  assert_eq!(DataKind::Airsigmet.url(&base).unwrap().as_str(), "https://aviationweather.gov/data/cache/airsigmets.cache.csv.gz");
  assert_eq!(DataKind::Stations.url(&base).unwrap().as_str(), "https://aviationweather.gov/data/cache/stations.cache.json.gz");
}

#[test]
fn test_base_url_without_slash() {
  let base = parse_base_url("http://127.0.0.1:8080/mirror").unwrap();
  assert_eq!(DataKind::Stations.url(&base).unwrap().as_str(), "http://127.0.0.1:8080/mirror/stations.cache.json.gz");
  assert!(matches!(parse_base_url("not a url"), Err(Error::MalformedUrl(_))));
}
