use std::path::PathBuf;

use chrono::NaiveTime;
use reqwest::{StatusCode, Url};

use crate::{error::{Error, Result}, io::{gunzip::gunzip_to, http::DownloadTask, FetchState}, kind::DataKind, ui::{bar::FeedBar, EventListener}};

use super::{link::PublishCurrent, snapshot::Layout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  Saved {
    kind: DataKind,
    snapshot: PathBuf,
    link: PathBuf,
    size: u64,
  },
  /// the server answered with anything but 200, nothing was written
  Rejected {
    kind: DataKind,
    url: String,
    status: StatusCode,
  },
}

impl FetchOutcome {
  pub fn is_saved(&self) -> bool {
    matches!(self, Self::Saved { .. })
  }
}

#[derive(Debug, Clone)]
pub enum Event {
  Start { kind: DataKind, url: Url },
  Progress { kind: DataKind, state: FetchState },
  Done(FetchOutcome),
}

impl FeedBar for Event {
  fn message(&self) -> Option<String> {
    match self {
      Self::Start { kind, .. } => Some(kind.to_string()),
      _ => None,
    }
  }

  fn position(&self) -> Option<u64> {
    match self {
      Self::Start { .. } => Some(0),
      Self::Progress { state, .. } => state.position(),
      Self::Done(_) => None,
    }
  }

  fn length(&self) -> Option<u64> {
    match self {
      Self::Progress { state, .. } => state.length(),
      _ => None,
    }
  }
}

pub type Clock = fn() -> NaiveTime;

fn local_clock() -> NaiveTime {
  chrono::Local::now().time()
}

pub struct Args<'a> {
  pub base_url: &'a Url,
  pub layout: &'a Layout,
  pub publisher: &'a dyn PublishCurrent,
  pub client: Option<reqwest::Client>,
  pub clock: Clock,
}

impl<'a> Args<'a> {
  pub fn new(base_url: &'a Url, layout: &'a Layout, publisher: &'a dyn PublishCurrent) -> Self {
    Self { base_url, layout, publisher, client: None, clock: local_clock }
  }
  pub fn client(self, client: reqwest::Client) -> Self {
    Self { client: Some(client), ..self }
  }
  pub fn clock(self, clock: Clock) -> Self {
    Self { clock, ..self }
  }
}

/// download, decompress and publish a single kind
#[tracing::instrument(level = "debug", skip_all, fields(kind = %kind))]
pub async fn step(args: &Args<'_>, kind: DataKind, tracker: impl EventListener<Event>) -> Result<FetchOutcome> {
  let url = kind.url(args.base_url)?;
  let snapshot = args.layout.snapshot_path(kind.base_name(), &(args.clock)());
  tracker.on_event(Event::Start { kind, url: url.clone() });

  let mut task = DownloadTask::new(url)?;
  task.client(args.client.clone());
  let body = match task.run(|state: FetchState| tracker.on_event(Event::Progress { kind, state })).await {
    Ok(body) => body,
    Err(Error::HttpStatus { url, status }) => {
      warn!(%kind, %url, %status, "download rejected, skip");
      return Ok(FetchOutcome::Rejected { kind, url, status });
    }
    Err(e) => return Err(e),
  };

  let size = gunzip_to(&body, &snapshot).await?;
  let link = args.layout.current_path(kind.base_name());
  args.publisher.publish(&snapshot, &link)?;
  info!(%kind, snapshot=%snapshot.display(), link=%link.display(), size, "saved");
  Ok(FetchOutcome::Saved { kind, snapshot, link, size })
}

/// Run the requested kinds one after another.
/// A rejected kind does not stop the rest, any other error does and kinds already saved stay.
#[tracing::instrument(level = "info", skip_all, fields(base_url = %args.base_url, output_dir = %args.layout.output_dir.display()))]
pub async fn exec<I: IntoIterator<Item = DataKind>>(args: &Args<'_>, kinds: I, tracker: impl EventListener<Event>) -> Result<Vec<FetchOutcome>> {
  let mut result = Vec::new();
  for kind in kinds {
    let outcome = step(args, kind, |e: Event| tracker.on_event(e)).await?;
    tracker.on_event(Event::Done(outcome.clone()));
    result.push(outcome);
  }
  Ok(result)
}

#[cfg(test)]
mod tests {
  use std::{path::Path, sync::Mutex};

  use wiremock::{matchers::{method, path}, Mock, MockServer, ResponseTemplate};

  use super::*;
  use crate::{kind::parse_base_url, stage::link::SymlinkPublisher, tests::*};

  fn fixed_clock() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 5, 0).unwrap()
  }

  async fn mount(server: &MockServer, kind: DataKind, template: ResponseTemplate) {
    Mock::given(method("GET")).and(path(format!("/{}", kind.remote_name())))
      .respond_with(template)
      .mount(server).await;
  }

  struct Fixture {
    _dir: tempfile::TempDir,
    layout: Layout,
    base_url: Url,
  }

  fn fixture(server: &MockServer) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::prepare(dir.path().join("avwx").join("raw")).unwrap();
    let base_url = parse_base_url(&server.uri()).unwrap();
    Fixture { _dir: dir, layout, base_url }
  }

  #[tokio::test]
  async fn test_fetch_all_kinds() {
    init_logger(None);
    let server = MockServer::start().await;
    for kind in DataKind::ALL {
      let payload = format!("{}-payload\nline 2\n", kind.name());
      mount(&server, kind, ResponseTemplate::new(200).set_body_bytes(gzip(payload.as_bytes()))).await;
    }
    let f = fixture(&server);
    let args = Args::new(&f.base_url, &f.layout, &SymlinkPublisher).clock(fixed_clock);

    let result = exec(&args, DataKind::ALL, ()).await.unwrap();
    assert_eq!(result.len(), 4);
    for (kind, outcome) in DataKind::ALL.into_iter().zip(&result) {
      let FetchOutcome::Saved { kind: saved, snapshot, link, size } = outcome else {
        panic!("{} not saved: {:?}", kind, outcome)
      };
      let expected = format!("{}-payload\nline 2\n", kind.name());
      assert_eq!(*saved, kind);
      assert_eq!(*size, expected.len() as u64);
      assert_eq!(std::fs::read(snapshot).unwrap(), expected.as_bytes());
      assert_eq!(std::fs::read_link(link).unwrap(), *snapshot);
      assert_eq!(link.parent(), Some(f.layout.link_dir.as_path()));
    }
    assert!(f.layout.output_dir.join("metars-1405.csv").is_file());
    assert!(f.layout.link_dir.join("stations_current.json").exists());
  }

  #[tokio::test]
  async fn test_rejected_kind_continues() {
    init_logger(None);
    let server = MockServer::start().await;
    mount(&server, DataKind::Metar, ResponseTemplate::new(404)).await;
    mount(&server, DataKind::Taf, ResponseTemplate::new(200).set_body_bytes(gzip(b"taf"))).await;
    let f = fixture(&server);

    let old = f.layout.output_dir.join("metars-0900.csv");
    std::fs::write(&old, "old metar").unwrap();
    let metar_link = f.layout.current_path("metars.csv");
    symlink::symlink_file(&old, &metar_link).unwrap();

    let events = Mutex::new(Vec::new());
    let args = Args::new(&f.base_url, &f.layout, &SymlinkPublisher).clock(fixed_clock);
    let result = exec(&args, [DataKind::Metar, DataKind::Taf], |e: Event| {
      if let Event::Done(outcome) = e {
        events.lock().unwrap().push(outcome);
      }
    }).await.unwrap();

    assert!(matches!(&result[0], FetchOutcome::Rejected { status, .. } if *status == StatusCode::NOT_FOUND));
    assert!(result[1].is_saved());
    assert_eq!(events.into_inner().unwrap(), result);
    assert!(!f.layout.output_dir.join("metars-1405.csv").exists());
    assert_eq!(std::fs::read_link(&metar_link).unwrap(), old);
    assert_eq!(std::fs::read(f.layout.current_path("tafs.csv")).unwrap(), b"taf");
  }

  #[tokio::test]
  async fn test_replaces_current_link() {
    init_logger(None);
    let server = MockServer::start().await;
    mount(&server, DataKind::Stations, ResponseTemplate::new(200).set_body_bytes(gzip(br#"[{"icaoId":"KSEA"}]"#))).await;
    let f = fixture(&server);

    let previous = f.layout.output_dir.join("stations-1300.json");
    std::fs::write(&previous, "[]").unwrap();
    let link = f.layout.current_path("stations.json");
    symlink::symlink_file(&previous, &link).unwrap();

    let args = Args::new(&f.base_url, &f.layout, &SymlinkPublisher).clock(fixed_clock);
    step(&args, DataKind::Stations, ()).await.unwrap();

    let snapshot = f.layout.output_dir.join("stations-1405.json");
    assert_eq!(std::fs::read_link(&link).unwrap(), snapshot);
    assert_eq!(std::fs::read_to_string(&link).unwrap(), r#"[{"icaoId":"KSEA"}]"#);
    assert!(previous.exists());
    let links = std::fs::read_dir(&f.layout.link_dir).unwrap()
      .filter_map(|i| i.ok())
      .filter(|i| i.file_name().to_string_lossy().starts_with("stations_current"))
      .count();
    assert_eq!(links, 1);
  }

  #[tokio::test]
  async fn test_malformed_gzip_aborts() {
    init_logger(None);
    let server = MockServer::start().await;
    mount(&server, DataKind::Airsigmet, ResponseTemplate::new(200).set_body_bytes(b"garbage".to_vec())).await;
    mount(&server, DataKind::Stations, ResponseTemplate::new(200).set_body_bytes(gzip(b"[]"))).await;
    let f = fixture(&server);

    let args = Args::new(&f.base_url, &f.layout, &SymlinkPublisher).clock(fixed_clock);
    let err = exec(&args, [DataKind::Airsigmet, DataKind::Stations], ()).await.unwrap_err();
    assert!(matches!(err, Error::IoFailed { action: "gunzip", .. }));
    assert!(!f.layout.output_dir.join("airsigmets-1405.csv").exists());
    assert!(!f.layout.output_dir.join("stations-1405.json").exists());
    assert!(f.layout.current_path("airsigmets.csv").symlink_metadata().is_err());
  }

  #[tokio::test]
  async fn test_transport_error_aborts() {
    init_logger(None);
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::prepare(dir.path().join("raw")).unwrap();
    // nothing listens on port 9 of localhost
    let base_url = parse_base_url("http://127.0.0.1:9/").unwrap();
    let args = Args::new(&base_url, &layout, &SymlinkPublisher).clock(fixed_clock);
    let err = exec(&args, [DataKind::Metar], ()).await.unwrap_err();
    assert!(matches!(err, Error::HttpDownloadFailed { .. }));
    assert_eq!(std::fs::read_dir(&layout.output_dir).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn test_no_kinds() {
    init_logger(None);
    let server = MockServer::start().await;
    let f = fixture(&server);
    let args = Args::new(&f.base_url, &f.layout, &SymlinkPublisher);
    let result = exec(&args, Vec::<DataKind>::new(), ()).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(std::fs::read_dir(&f.layout.output_dir).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(&f.layout.link_dir).unwrap().count(), 1);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    assert!(Path::new(&f.layout.output_dir).is_dir());
  }
}
