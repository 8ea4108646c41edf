//! Expands one code-host webhook into one per-workspace sub-job.

use chrono::{DateTime, Utc};
use serde::{Deserialize as De, Serialize as Ser};

use crate::github::{webhook, WebhookEvent};
use crate::queue::{Envelope, JobType};
use crate::reconciler::WorkspacePrPayload;
use crate::store::{self, RepoSubscriptions};

#[derive(Debug)]
pub enum Error {
  Store(store::Error),
  Queue(crate::queue::Error),
  MalformedPayload(String),
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

/// Wire shape of a `code_host_webhook` envelope payload. `raw_body` is the untouched JSON the
/// ingress already verified the signature over.
#[derive(Clone, Debug, Ser, De)]
pub struct CodeHostWebhookPayload {
  pub id: String,
  pub event_type: String,
  pub delivery_id: String,
  pub raw_body: String,
  pub received_at: DateTime<Utc>,
  pub trace_id: String,
}

/// Entry point for a `code_host_webhook` job.
pub fn handle(state: &crate::State, payload: &CodeHostWebhookPayload) -> Result<()> {
  let event = webhook::parse_event(&payload.event_type, payload.raw_body.as_bytes())
    .map_err(|e| Error::MalformedPayload(format!("{:?}", e)))?;

  let event = match event {
    | Some(e) => e,
    | None => return Ok(()),
  };

  match event {
    | WebhookEvent::PullRequest(ev) => fan_out_pull_request(state, &ev, &payload.trace_id),
    | WebhookEvent::PullRequestReview(ev) => {
      enqueue_reaction_sync(state, &ev.repository.full_name, ev.pull_request.number, &payload.trace_id)
    },
  }
}

fn fan_out_pull_request(state: &crate::State, ev: &crate::github::PullRequestEvent, trace_id: &str) -> Result<()> {
  let subscriptions = state.store.subscriptions_for_repo(&ev.repository.full_name)?;

  if subscriptions.is_empty() {
    log::warn!("no subscription for {}, dropping pull_request event", ev.repository.full_name);
    return Ok(());
  }

  let annotated_channel = crate::directives::parse(ev.pull_request.body.as_deref().unwrap_or("")).channel;

  for sub in subscriptions {
    let payload = WorkspacePrPayload { pr_number: ev.pull_request.number,
                                      repo_full_name: ev.repository.full_name.clone(),
                                      workspace_id: sub.workspace_id,
                                      pr_action: ev.action.clone(),
                                      github_user_id: ev.pull_request.user.id,
                                      github_username: ev.pull_request.user.login.clone(),
                                      annotated_channel: annotated_channel.clone(),
                                      pr_payload: WorkspacePrPayload::encode_pr(&ev.pull_request) };

    let envelope = Envelope::new(JobType::WorkspacePr,
                                 trace_id.to_string(),
                                 serde_json::to_value(&payload).expect("WorkspacePrPayload always serializes"));
    state.queue.enqueue(envelope)?;
  }

  Ok(())
}

fn enqueue_reaction_sync(state: &crate::State, repo_full_name: &str, pr_number: u64, trace_id: &str) -> Result<()> {
  let payload = crate::reactions_sync::ReactionSyncPayload { repo_full_name: repo_full_name.to_string(),
                                                             pr_number,
                                                             trace_id: trace_id.to_string() };

  let envelope = Envelope::new(JobType::ReactionSync,
                               trace_id.to_string(),
                               serde_json::to_value(&payload).expect("ReactionSyncPayload always serializes"));
  state.queue.enqueue(envelope).map_err(Error::from)
}
