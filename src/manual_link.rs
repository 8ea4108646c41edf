//! Recognizes PR URLs pasted into chat and adopts them into the tracked-message set.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize as De, Serialize as Ser};

use crate::store::{self, ChannelConfigs, MessageSource, TrackedMessage, TrackedMessages};
use crate::queue::{Envelope, JobType};

lazy_static! {
  static ref PR_URL: Regex = Regex::new(r"https?://[^/\s]+/([^/\s]+/[^/\s]+)/pull/(\d+)").unwrap();
}

#[derive(Debug)]
pub enum Error {
  Store(store::Error),
  Queue(crate::queue::Error),
  NoWorkspace,
}

impl From<store::Error> for Error {
  fn from(e: store::Error) -> Self {
    Error::Store(e)
  }
}
impl From<crate::queue::Error> for Error {
  fn from(e: crate::queue::Error) -> Self {
    Error::Queue(e)
  }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Wire shape of a `manual_pr_link` envelope payload. The ingress has already matched exactly
/// one PR URL before enqueuing this.
#[derive(Clone, Debug, Ser, De)]
pub struct ManualPrLinkPayload {
  pub pr_number: u64,
  pub repo_full_name: String,
  pub slack_channel: String,
  pub slack_message_ts: String,
  pub slack_team_id: String,
  pub trace_id: String,
}

/// Scans `text` for PR URLs. Returns `Some((repo_full_name, pr_number))` only when exactly one
/// match is present; zero or multiple matches are ambiguous and are not adopted.
pub fn extract_single_pr_url(text: &str) -> Option<(String, u64)> {
  let mut matches = PR_URL.captures_iter(text);
  let first = matches.next()?;
  if matches.next().is_some() {
    return None;
  }

  let repo_full_name = first.get(1)?.as_str().to_string();
  let pr_number = first.get(2)?.as_str().parse().ok()?;
  Some((repo_full_name, pr_number))
}

/// Entry point for a `manual_pr_link` job.
pub fn handle(state: &crate::State, payload: &ManualPrLinkPayload) -> Result<()> {
  // Workspace id and chat team id coincide for this bridge.
  let workspace_id = &payload.slack_team_id;

  if !state.store.manual_tracking_enabled(workspace_id, &payload.slack_channel)? {
    log::debug!("manual tracking disabled in {}#{}, dropping", workspace_id, payload.slack_channel);
    return Ok(());
  }

  if state.workspace_cache.get(&*state.store, workspace_id)?.is_none() {
    return Err(Error::NoWorkspace);
  }

  let row = TrackedMessage::new(workspace_id,
                                &payload.slack_channel,
                                &payload.slack_message_ts,
                                &payload.repo_full_name,
                                payload.pr_number,
                                MessageSource::Manual,
                                "");
  state.store.save_tracked_message(&row)?;

  let sync_payload = crate::reactions_sync::ReactionSyncPayload { repo_full_name: payload.repo_full_name.clone(),
                                                                   pr_number: payload.pr_number,
                                                                   trace_id: payload.trace_id.clone() };
  let envelope = Envelope::new(JobType::ReactionSync,
                               payload.trace_id.clone(),
                               serde_json::to_value(&sync_payload).expect("ReactionSyncPayload always serializes"));
  state.queue.enqueue(envelope)?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_url_is_adopted() {
    let text = "check out https://github.com/acme/widgets/pull/42 please";
    assert_eq!(extract_single_pr_url(text), Some(("acme/widgets".to_string(), 42)));
  }

  #[test]
  fn zero_urls_yields_none() {
    assert_eq!(extract_single_pr_url("no links here"), None);
  }

  #[test]
  fn two_urls_yields_none() {
    let text = "https://github.com/a/b/pull/1 and https://github.com/c/d/pull/2";
    assert_eq!(extract_single_pr_url(text), None);
  }

  #[test]
  fn non_github_host_still_matches_pattern() {
    let text = "https://git.example.com/a/b/pull/9";
    assert_eq!(extract_single_pr_url(text), Some(("a/b".to_string(), 9)));
  }
}
