use std::path::{Path, PathBuf};

use anyhow::Context as _;
use core_lib::{kind::DEFAULT_BASE_URL, stage::link::{CopyPublisher, PublishCurrent, SymlinkPublisher}};

pub const DEFAULT_CONFIG: &str = "avwx.toml";

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
  #[serde(default)]
  pub base: BaseConfig,
  #[serde(default)]
  pub network: NetworkConfig,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BaseConfig {
  pub output_dir: Option<PathBuf>,
  #[serde(default)]
  pub publish: PublishMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
  #[default]
  Symlink,
  Copy,
}

impl PublishMode {
  pub fn publisher(&self) -> Box<dyn PublishCurrent> {
    match self {
      Self::Symlink => Box::new(SymlinkPublisher),
      Self::Copy => Box::new(CopyPublisher),
    }
  }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NetworkConfig {
  #[serde(default = "base_url_default")]
  pub base_url: String,
  pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self {
      base_url: base_url_default(),
      user_agent: None,
    }
  }
}

fn base_url_default() -> String { DEFAULT_BASE_URL.to_string() }

impl NetworkConfig {
  pub fn client(&self) -> anyhow::Result<reqwest::Client> {
    let user_agent = self.user_agent.clone().unwrap_or_else(|| concat!("get-avwx-data/", env!("CARGO_PKG_VERSION")).to_string());
    Ok(reqwest::Client::builder().user_agent(user_agent).build()?)
  }
}

pub fn read_toml<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<T> {
  let path = path.as_ref();
  let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
  toml::from_str(&s).with_context(|| format!("parse config {}", path.display()))
}

impl Config {
  /// An explicitly named file must exist, the default one is optional.
  pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
    match path {
      Some(path) => read_toml(path),
      None if Path::new(DEFAULT_CONFIG).exists() => read_toml(DEFAULT_CONFIG),
      None => Ok(Self::default()),
    }
  }
}
