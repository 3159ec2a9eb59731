use std::path::{Path, PathBuf};

use chrono::Timelike;

use crate::error::{ErrorExt, Result};

/// `-HHMM` on a 24h clock.
pub fn timestamp_suffix<T: Timelike>(time: &T) -> String {
  format!("-{:02}{:02}", time.hour(), time.minute())
}

/// split `metars.csv` into (`metars`, `.csv`), the extension keeps its dot.
/// A leading dot is part of the stem, like `.env` has no extension.
fn split_ext(base_name: &str) -> (&str, &str) {
  match base_name.rfind('.') {
    Some(i) if i > 0 => base_name.split_at(i),
    _ => (base_name, ""),
  }
}

/// `metars.csv` at 14:05 gives `metars-1405.csv`.
/// Runs within the same minute produce the same name, the later one overwrites.
pub fn snapshot_name<T: Timelike>(base_name: &str, time: &T) -> String {
  let (stem, ext) = split_ext(base_name);
  format!("{}{}{}", stem, timestamp_suffix(time), ext)
}

/// `stations.json` gives `stations_current.json`.
pub fn current_name(base_name: &str) -> String {
  let (stem, ext) = split_ext(base_name);
  format!("{}_current{}", stem, ext)
}

/// Parent of `output_dir` as written, or `output_dir` itself when there is none:
/// `.`, `raw` and `/` keep their links next to the snapshots, `data/raw` links into `data`.
pub fn link_dir_of(output_dir: &Path) -> &Path {
  match output_dir.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => output_dir,
  }
}

/// Where snapshots and the current links of one run go.
/// Both paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  pub output_dir: PathBuf,
  pub link_dir: PathBuf,
}

impl Layout {
  /// Create `output_dir` with missing parents and resolve both directories to absolute paths.
  /// The link dir is taken from the path as given, before it is resolved.
  #[tracing::instrument(level = "debug", skip_all, fields(output_dir = %output_dir.as_ref().display()))]
  pub fn prepare<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).when(("create_dir_all", output_dir))?;
    let link_dir = link_dir_of(output_dir);
    let link_dir = link_dir.canonicalize().when(("canonicalize", link_dir))?;
    let output_dir = output_dir.canonicalize().when(("canonicalize", output_dir))?;
    Ok(Self { output_dir, link_dir })
  }

  pub fn new(output_dir: PathBuf) -> Self {
    let link_dir = link_dir_of(&output_dir).to_path_buf();
    Self { output_dir, link_dir }
  }

  pub fn snapshot_path<T: Timelike>(&self, base_name: &str, time: &T) -> PathBuf {
    self.output_dir.join(snapshot_name(base_name, time))
  }

  pub fn current_path(&self, base_name: &str) -> PathBuf {
    self.link_dir.join(current_name(base_name))
  }
}
