use std::path::PathBuf;

use anyhow::Result;
use core_lib::{kind::parse_base_url, stage::{fetch::{self, Event, FetchOutcome}, snapshot::Layout}, ui::{bar::{ActiveSuspendable, Suspendable}, EventListener as _}};
use indicatif::ProgressBar;

use crate::{command::PbStyle, config::Config, Args};

/// what the user sees on stdout for one kind
pub fn report_lines(outcome: &FetchOutcome) -> Vec<String> {
  match outcome {
    FetchOutcome::Saved { snapshot, link, .. } => vec![
      format!("Data saved to {}", snapshot.display()),
      format!("Symlink created at {}", link.display()),
    ],
    FetchOutcome::Rejected { url, status, .. } => vec![
      format!("Error: Unable to download data from {} ({})", url, status),
    ],
  }
}

#[tracing::instrument(level = "info", skip_all, fields(kinds = ?args.kinds()))]
pub async fn run(config: &Config, args: &Args, active: ActiveSuspendable) -> Result<Vec<FetchOutcome>> {
  let kinds = args.kinds();
  if kinds.is_empty() {
    debug!("no data kind requested");
    return Ok(Vec::new())
  }

  let output_dir = args.output_dir.clone()
    .or_else(|| config.base.output_dir.clone())
    .unwrap_or_else(|| PathBuf::from("."));
  let layout = Layout::prepare(&output_dir)?;
  let base_url = parse_base_url(args.base_url.as_deref().unwrap_or(&config.network.base_url))?;
  let publisher = config.base.publish.publisher();
  let fetch_args = fetch::Args::new(&base_url, &layout, &*publisher)
    .client(config.network.client()?);
  info!(output_dir=%layout.output_dir.display(), link_dir=%layout.link_dir.display(), %base_url, publish=?config.base.publish);

  let pb = ProgressBar::new(0);
  pb.set_style(PbStyle::Bytes.style());
  let old = active.write().ok().and_then(|mut i| i.replace(Suspendable::ProgressBar(pb.clone())));
  let result = fetch::exec(&fetch_args, kinds, |e: Event| {
    pb.on_event(e.clone());
    if let Event::Done(outcome) = e {
      pb.suspend(|| report_lines(&outcome).iter().for_each(|line| println!("{}", line)));
    }
  }).await;
  pb.finish_and_clear();
  if let Ok(mut active) = active.write() {
    *active = old;
  }

  let outcomes = result?;
  info!(saved=outcomes.iter().filter(|i| i.is_saved()).count(), rejected=outcomes.iter().filter(|i| !i.is_saved()).count(), "done");
  Ok(outcomes)
}
