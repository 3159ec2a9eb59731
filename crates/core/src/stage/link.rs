use std::path::Path;

use crate::{error::{ErrorExt, IoErrorExt, Result}, io::tmp_path};

/// Repoint the "current" entry of a kind at a freshly written snapshot.
pub trait PublishCurrent {
  fn publish(&self, snapshot: &Path, link: &Path) -> Result<()>;
}

impl<P: PublishCurrent + ?Sized> PublishCurrent for Box<P> {
  fn publish(&self, snapshot: &Path, link: &Path) -> Result<()> {
    (**self).publish(snapshot, link)
  }
}

/// `ln -sf snapshot link`, the default wherever symlinks exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkPublisher;

/// Copy the snapshot over the link path, for filesystems without symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyPublisher;

/// Remove whatever sits at `link`: a regular file, a live symlink or a dangling one.
/// A directory is left alone and reported by the following create.
fn remove_existing(link: &Path) -> std::io::Result<()> {
  let Some(meta) = std::fs::symlink_metadata(link).ok_not_found()? else {
    return Ok(())
  };
  if meta.file_type().is_symlink() {
    symlink::remove_symlink_file(link)
  } else if meta.is_file() {
    std::fs::remove_file(link)
  } else {
    Ok(())
  }
}

pub fn symlink_file<P: AsRef<Path>, Q: AsRef<Path>>(original: P, link: Q) -> std::io::Result<()> {
  let link = link.as_ref();
  if !original.as_ref().exists() {
    return Err(std::io::Error::other("link original not present"))
  }
  remove_existing(link)?;
  debug!(origin=%original.as_ref().display(), link=%link.display(), "ln -s");
  symlink::symlink_file(original, link)
}

impl PublishCurrent for SymlinkPublisher {
  fn publish(&self, snapshot: &Path, link: &Path) -> Result<()> {
    symlink_file(snapshot, link).when(("symlink", link))
  }
}

impl PublishCurrent for CopyPublisher {
  fn publish(&self, snapshot: &Path, link: &Path) -> Result<()> {
    let tmp = tmp_path(link, ".tmp");
    debug!(origin=%snapshot.display(), link=%link.display(), "cp");
    std::fs::copy(snapshot, &tmp).when(("copy", &tmp))?;
    remove_existing(link).when(("remove", link))?;
    std::fs::rename(&tmp, link).when(("rename", link))?;
    Ok(())
  }
}
