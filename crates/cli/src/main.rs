#[macro_use] extern crate tracing;

use std::{path::PathBuf, sync::{Arc, RwLock}};

use clap::Parser;
use core_lib::{kind::DataKind, ui::bar::{ActiveSuspendable, PbWriter}};
use tracing_subscriber::fmt::format::FmtSpan;

pub mod config;
pub mod command;

/// Download and uncompress aviation weather data
#[derive(Debug, Clone, Default, clap::Parser)]
#[command(version)]
pub struct Args {
  /// Download and uncompress METAR data
  #[arg(long)]
  pub metar: bool,
  /// Download and uncompress TAF data
  #[arg(long)]
  pub taf: bool,
  /// Download and uncompress AirSIGMET data
  #[arg(long)]
  pub airsigmet: bool,
  /// Download and uncompress Station data
  #[arg(long)]
  pub stations: bool,
  /// Directory to save the files (default: current directory)
  #[arg(long = "output_dir", visible_alias = "output-dir", value_name = "PATH")]
  pub output_dir: Option<PathBuf>,
  /// TOML config file, `avwx.toml` is read when present
  #[arg(long, value_name = "PATH")]
  pub config: Option<PathBuf>,
  /// Fetch from a mirror of the cache directory instead
  #[arg(long, value_name = "URL")]
  pub base_url: Option<String>,
}

impl Args {
  pub fn kinds(&self) -> Vec<DataKind> {
    DataKind::ALL.into_iter().filter(|kind| match kind {
      DataKind::Metar => self.metar,
      DataKind::Taf => self.taf,
      DataKind::Airsigmet => self.airsigmet,
      DataKind::Stations => self.stations,
    }).collect()
  }
}

lazy_static::lazy_static! {
  static ref ACTIVE_PB: ActiveSuspendable = Arc::new(RwLock::new(None));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
    .compact()
    .with_writer(move || PbWriter::new(ACTIVE_PB.read().map(|pb| pb.clone()).unwrap_or(None), std::io::stderr()))
    .try_init();
  let args = Args::parse();
  let config = config::Config::load(args.config.as_deref())?;
  info!(?config, ?args);
  command::fetch::run(&config, &args, ACTIVE_PB.clone()).await?;
  Ok(())
}
