use std::path::{Path, PathBuf};

pub mod http;
pub mod gunzip;

/// bytes received so far, `max` is 0 when the server sends no content-length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchState {
  pub current: u64,
  pub max: u64,
}

impl crate::ui::bar::FeedBar for FetchState {
  fn message(&self) -> Option<String> { None }
  fn position(&self) -> Option<u64> { Some(self.current) }
  fn length(&self) -> Option<u64> { if self.max == 0 { None } else { Some(self.max) } }
}

/// append suffix to the file name, `a/b.csv` with `.tmp` becomes `a/b.csv.tmp`
pub fn tmp_path<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
  let mut tmp = path.as_ref().to_path_buf();
  let mut stem = tmp.file_name().unwrap_or_default().to_os_string();
  stem.push(suffix);
  tmp.set_file_name(stem);
  tmp
}

#[test]
fn test_tmp_path() {
  assert_eq!(tmp_path("out/metars_current.csv", ".tmp"), Path::new("out/metars_current.csv.tmp"));
}
