use std::path::Path;

use async_compression::tokio::bufread::GzipDecoder;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

use crate::error::{ErrorExt, Result};

/// Decompress a whole gzip payload in memory.
/// Concatenated gzip members are decoded as one stream, same as `gunzip`.
pub async fn gunzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
  let mut decoder = GzipDecoder::new(body);
  decoder.multiple_members(true);
  let mut out = Vec::with_capacity(body.len() * 4);
  decoder.read_to_end(&mut out).await?;
  Ok(out)
}

/// Decode `body` and write the result to `dest`, creating or truncating it.
/// Nothing touches `dest` until the payload decoded completely.
#[tracing::instrument(level = "trace", skip_all, fields(dest = %dest.as_ref().display(), compressed = body.len()))]
pub async fn gunzip_to<P: AsRef<Path>>(body: &[u8], dest: P) -> Result<u64> {
  let dest = dest.as_ref();
  let data = gunzip(body).await.when(("gunzip", dest))?;
  let mut file = tokio::fs::File::create(dest).await.when(("create", dest))?;
  file.write_all(&data).await.when(("write", dest))?;
  file.sync_all().await.when(("sync", dest))?;
  Ok(data.len() as u64)
}
