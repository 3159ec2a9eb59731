use crate::{error::{Error, ErrorExt, Result}, ui::EventListener};

use futures::StreamExt as _;
use reqwest::{IntoUrl, StatusCode, Url};

use super::FetchState;

/// content-length is only a hint, never reserve more than this up front
const PREALLOC_LIMIT: u64 = 64 << 20;

/// The download task would GET url and collect the whole body in memory.
/// Only status 200 counts as success, anything else is `Error::HttpStatus`.
#[derive(Debug, Clone)]
pub struct DownloadTask {
  pub client: Option<reqwest::Client>,
  pub url: Url,
}

impl DownloadTask {
  pub fn new<U: IntoUrl>(url: U) -> Result<Self> {
    let url = into_url(url)?;
    Ok(Self { client: None, url })
  }

  pub fn client(&mut self, client: Option<reqwest::Client>) -> &mut Self {
    self.client = client;
    self
  }

  #[tracing::instrument(level = "trace", skip_all, fields(url = %self.url.as_str()))]
  pub async fn run(&self, tracker: impl EventListener<FetchState>) -> Result<Vec<u8>> {
    let client = self.client.clone().unwrap_or_else(|| reqwest::Client::new());
    let resp = client.get(self.url.clone()).send().await.when(self)?;
    if resp.status() != StatusCode::OK {
      info!(url=%self.url, status_code=?resp.status(), "request failed");
      return Err(Error::HttpStatus { url: self.url.to_string(), status: resp.status() });
    }
    let length = resp.content_length().unwrap_or(0);
    let mut body = Vec::with_capacity(length.min(PREALLOC_LIMIT) as usize);
    let mut stream = resp.bytes_stream();
    while let Some(bytes) = stream.next().await {
      let bytes = bytes.when(self)?;
      body.extend_from_slice(&bytes);
      tracker.on_event(FetchState { current: body.len() as u64, max: length });
    }
    debug!(url=%self.url, len=body.len(), "downloaded");
    Ok(body)
  }
}

fn into_url(url: impl IntoUrl) -> Result<Url> {
  let url_string = url.as_str().to_string();
  url.into_url().map_err(|_| Error::MalformedUrl(url_string))
}

#[cfg(test)]
mod tests {
  use super::*;
  use wiremock::{matchers::{method, path}, Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_download_body() {
    crate::tests::init_logger(None);
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/metars.cache.csv.gz"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw bytes".to_vec()))
      .mount(&server).await;

    let events = std::sync::Mutex::new(Vec::new());
    let task = DownloadTask::new(format!("{}/metars.cache.csv.gz", server.uri())).unwrap();
    let body = task.run(|e: FetchState| events.lock().unwrap().push(e)).await.unwrap();
    assert_eq!(body, b"raw bytes");
    let events = events.into_inner().unwrap();
    assert_eq!(events.last().map(|e| e.current), Some(9));
  }

  #[tokio::test]
  async fn test_download_non_200() {
    crate::tests::init_logger(None);
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/tafs.cache.csv.gz"))
      .respond_with(ResponseTemplate::new(204))
      .mount(&server).await;

    let task = DownloadTask::new(format!("{}/tafs.cache.csv.gz", server.uri())).unwrap();
    let err = task.run(()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));
  }

  #[tokio::test]
  async fn test_inflated_content_length() {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    crate::tests::init_logger(None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 1024];
      let _ = socket.read(&mut buf).await;
      socket.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 9223372036854775000\r\n\r\nabc").await.unwrap();
      socket.shutdown().await.ok();
    });

    let task = DownloadTask::new(format!("http://{}/metars.cache.csv.gz", addr)).unwrap();
    let err = task.run(()).await.unwrap_err();
    assert!(matches!(err, Error::HttpDownloadFailed { .. }));
    server.await.unwrap();
  }

  #[test]
  fn test_malformed_url() {
    assert!(matches!(DownloadTask::new("::nope"), Err(Error::MalformedUrl(_))));
  }
}
