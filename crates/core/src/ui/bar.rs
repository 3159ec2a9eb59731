use std::sync::{Arc, RwLock};

use indicatif::ProgressBar;

use super::EventListener;

pub type ActiveSuspendable = Arc<RwLock<Option<Suspendable>>>;

/// Line buffered writer that hides the active progress bar while a line goes out.
pub struct PbWriter<W> {
  pb: Option<Suspendable>,
  writer: W,
  buffer: Vec<u8>,
}

impl<W> PbWriter<W> {
  pub fn new(pb: Option<Suspendable>, writer: W) -> Self {
    Self {
      pb,
      writer,
      buffer: Vec::new(),
    }
  }
}

impl<W: std::io::Write> std::io::Write for PbWriter<W> {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.buffer.extend_from_slice(buf);
    if buf.ends_with("\n".as_bytes()) {
      self.flush()?;
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    let buf = std::mem::take(&mut self.buffer);
    if let Some(ref pb) = self.pb {
      pb.suspend(|| {
        self.writer.write_all(&buf)?;
        self.writer.flush()
      })
    } else {
      self.writer.write_all(&buf)?;
      self.writer.flush()
    }
  }
}

#[derive(Clone)]
pub enum Suspendable {
  ProgressBar(ProgressBar),
}

impl Suspendable {
  pub fn suspend<R, F: FnOnce() -> R>(&self, f: F) -> R {
    match self {
      Suspendable::ProgressBar(pb) => pb.suspend(f),
    }
  }
}

pub trait FeedBar {
  fn message(&self) -> Option<String>;
  fn position(&self) -> Option<u64>;
  fn length(&self) -> Option<u64>;
}

impl<T: FeedBar> EventListener<T> for ProgressBar {
  fn on_event(&self, event: T) {
    if let Some(msg) = event.message() {
      self.set_message(msg);
    }
    if let Some(len) = event.length() {
      self.set_length(len);
    }
    if let Some(pos) = event.position() {
      self.set_position(pos);
    }
  }
}
