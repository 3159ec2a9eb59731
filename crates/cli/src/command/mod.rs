use indicatif::ProgressStyle;

pub mod fetch;

pub enum PbStyle {
  Bytes,
}

impl PbStyle {
  pub fn style(&self) -> ProgressStyle {
    match self {
      Self::Bytes => ProgressStyle::default_bar()
        .template("{spinner:.green} {msg:10} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
        .expect("style with_template"),
    }.progress_chars("#>-")
  }
}
