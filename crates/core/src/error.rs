use crate::io::http::DownloadTask;
use std::{path::{Path, PathBuf}, result::Result as StdResult};

pub type Result<T, E=Error> = StdResult<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("download from {} failed, caused by: {error}", .task.url)]
  HttpDownloadFailed {
    task: DownloadTask,
    #[source]
    error: reqwest::Error,
  },
  #[error("download from {url} failed with status {status}")]
  HttpStatus {
    url: String,
    status: reqwest::StatusCode,
  },
  #[error("io failed when {} file {}, caused by: {error}", .action, .filename.to_string_lossy())]
  IoFailed {
    action: &'static str,
    filename: PathBuf,
    #[source]
    error: std::io::Error,
  },
  #[error("malformed url {}", .0)]
  MalformedUrl(String),
}

impl Error {
  pub fn status(&self) -> Option<reqwest::StatusCode> {
    match self {
      Self::HttpStatus { status, .. } => Some(*status),
      _ => None,
    }
  }
}

pub trait ErrorExt<'a, T, E> {
  type Ctx: 'a;
  fn when(self, ctx: Self::Ctx) -> Result<T, Error>;
}

impl<'a, T> ErrorExt<'a, T, reqwest::Error> for StdResult<T, reqwest::Error> {
  type Ctx = &'a DownloadTask;
  fn when(self, ctx: Self::Ctx) -> Result<T> {
    self.map_err(|error| Error::HttpDownloadFailed { task: ctx.clone(), error })
  }
}

impl<'a, T> ErrorExt<'a, T, std::io::Error> for StdResult<T, std::io::Error> {
  type Ctx = (&'static str, &'a Path);
  fn when(self, (action, filename): Self::Ctx) -> Result<T> {
    self.map_err(|error| Error::IoFailed { action, filename: filename.to_owned(), error })
  }
}

pub trait IoErrorExt<T> {
  /// treat NotFound as success, e.g. removing a file that is already gone
  fn ok_not_found(self) -> std::io::Result<Option<T>>;
}

impl<T> IoErrorExt<T> for std::io::Result<T> {
  fn ok_not_found(self) -> std::io::Result<Option<T>> {
    match self {
      Ok(t) => Ok(Some(t)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }
}
