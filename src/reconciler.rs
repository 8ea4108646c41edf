//! The PR reconciler: computes the desired Slack state for a PR in a workspace and converges to
//! it with the minimum set of chat mutations.

use serde::{Deserialize as De, Serialize as Ser};

use crate::directives::{self, Directives};
use crate::github::PullRequest;
use crate::slack::msg::Messages;
use crate::slack::reactions::{swallow_noop, Reactions};
use crate::store::{self, tracked_message::MessageSource, RepoSubscriptions, TrackedMessage, TrackedMessages, Users};
use crate::{size, State};

#[derive(Debug)]
pub enum Error {
  Store(store::Error),
  Slack(crate::slack::Error),
  /// No channel could be resolved for this PR; the job is retried until a subscription exists.
  NoTargetChannel,
  MalformedPayload(String),
}

impl From<store::Error> for Error {
  fn from(e: store::Error) -> Self {
    Error::Store(e)
  }
}

impl From<crate::slack::Error> for Error {
  fn from(e: crate::slack::Error) -> Self {
    Error::Slack(e)
  }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Wire shape of a `workspace_pr` envelope payload.
#[derive(Clone, Debug, Ser, De)]
pub struct WorkspacePrPayload {
  pub pr_number: u64,
  pub repo_full_name: String,
  pub workspace_id: String,
  pub pr_action: String,
  pub github_user_id: i64,
  pub github_username: String,
  pub annotated_channel: Option<String>,
  /// base64-encoded JSON of the full `PullRequest`, carried so each per-workspace job can act
  /// without a second code-host fetch.
  pub pr_payload: String,
}

impl WorkspacePrPayload {
  pub fn decode_pr(&self) -> Result<PullRequest> {
    let bytes = base64::decode(&self.pr_payload).map_err(|e| Error::MalformedPayload(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::MalformedPayload(e.to_string()))
  }

  pub fn encode_pr(pr: &PullRequest) -> String {
    let json = serde_json::to_vec(pr).expect("PullRequest always serializes");
    base64::encode(json)
  }
}

/// The classified intended outcome for a PR in a workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesiredState {
  Absent,
  PresentOpen,
  PresentTerminalClosed,
  PresentTerminalMerged,
}

impl DesiredState {
  fn terminal_reaction(self) -> Option<&'static str> {
    match self {
      | DesiredState::PresentTerminalClosed => Some("closed"),
      | DesiredState::PresentTerminalMerged => Some("merged"),
      | _ => None,
    }
  }
}

pub fn classify(action: &str, pr: &PullRequest, directives: &Directives) -> DesiredState {
  if directives.skip {
    return DesiredState::Absent;
  }

  match action {
    | "opened" if pr.draft => DesiredState::Absent,
    | "closed" if pr.merged => DesiredState::PresentTerminalMerged,
    | "closed" => DesiredState::PresentTerminalClosed,
    | _ => DesiredState::PresentOpen,
  }
}

fn author_display(state: &State, author_login: &str, author_github_id: i64) -> Result<String> {
  let user = state.store.get_user_by_github_id(author_github_id)?;
  Ok(user.map(|u| u.display(author_login)).unwrap_or_else(|| format!("@{}", author_login)))
}

fn cc_mentions(state: &State, logins: &[String]) -> Result<Vec<String>> {
  let mut out = Vec::with_capacity(logins.len());
  for login in logins {
    let user = state.store.get_user_by_login(login)?;
    out.push(user.map(|u| u.display(login)).unwrap_or_else(|| format!("@{}", login)));
  }
  Ok(out)
}

fn desired_text(pr: &PullRequest, directives: &Directives, author_display: &str, cc: &[String]) -> String {
  let emoji = directives.custom_emoji
                        .clone()
                        .unwrap_or_else(|| size::bucket_emoji(pr.additions + pr.deletions).to_string());

  let mut text = format!(":{}: <{}|{}> by {}", emoji, pr.html_url, pr.title, author_display);

  if !cc.is_empty() {
    text.push_str(&format!(" (cc: {})", cc.join(", ")));
  }

  text
}

fn target_channel(directives: &Directives, annotated_channel: &Option<String>, subscription_channel: &str) -> String {
  directives.channel
            .clone()
            .or_else(|| annotated_channel.clone())
            .unwrap_or_else(|| subscription_channel.to_string())
}

/// Entry point for a `workspace_pr` job.
pub fn handle(state: &State, payload: &WorkspacePrPayload) -> Result<()> {
  let pr = payload.decode_pr()?;
  let directives = directives::parse(pr.body.as_deref().unwrap_or(""));

  let subscription = state.store
                          .get_subscription(&payload.workspace_id, &payload.repo_full_name)?
                          .ok_or(Error::NoTargetChannel)?;

  let workspace = state.workspace_cache
                       .get(&*state.store, &payload.workspace_id)?
                       .ok_or(Error::NoTargetChannel)?;

  let target = target_channel(&directives, &payload.annotated_channel, &subscription.channel_id);
  let desired = classify(&payload.pr_action, &pr, &directives);

  let existing = state.store.live_bot_messages(&payload.workspace_id, &payload.repo_full_name, pr.number)?;

  let api = state.slack_api(&workspace.bot_access_token);

  match desired {
    | DesiredState::Absent => delete_all(state, &api, &existing),
    | _ => {
      let author = author_display(state, &pr.user.login, pr.user.id)?;
      let cc = cc_mentions(state, &directives.user_to_cc)?;
      let text = desired_text(&pr, &directives, &author, &cc);

      converge_present(state, &api, &existing, &target, &payload.workspace_id, &payload.repo_full_name, pr.number,
                        &text, &directives, desired, &pr.user.login)
    },
  }
}

fn delete_all(state: &State, api: &crate::slack::Api, existing: &[TrackedMessage]) -> Result<()> {
  for row in existing {
    delete_row(state, api, row)?;
  }
  Ok(())
}

fn delete_row(state: &State, api: &crate::slack::Api, row: &TrackedMessage) -> Result<()> {
  match api.delete(&row.channel_id, &row.message_ts) {
    | Ok(()) => {},
    | Err(e) if e.is_expected_noop() => {},
    | Err(e) => return Err(e.into()),
  }

  let mut row = row.clone();
  row.deleted_by_user = true;
  state.store.save_tracked_message(&row)?;
  Ok(())
}

#[allow(clippy::too_many_arguments)]
fn converge_present(state: &State,
                    api: &crate::slack::Api,
                    existing: &[TrackedMessage],
                    target_channel: &str,
                    workspace_id: &str,
                    repo_full_name: &str,
                    pr_number: u64,
                    text: &str,
                    directives: &Directives,
                    desired: DesiredState,
                    author_login: &str)
                    -> Result<()> {
  let in_target = existing.iter().find(|m| m.channel_id == target_channel).cloned();
  let elsewhere: Vec<TrackedMessage> = existing.iter().filter(|m| m.channel_id != target_channel).cloned().collect();

  let row = match in_target {
    | None => {
      if !elsewhere.is_empty() {
        for row in &elsewhere {
          delete_row(state, api, row)?;
        }
      }

      let rep = api.send(target_channel, text)?;
      let mut row = TrackedMessage::new(workspace_id, target_channel, &rep.id.ts, repo_full_name, pr_number,
                                        MessageSource::Bot, text);
      row.cc = directives.user_to_cc.clone();
      row.has_review_directive = directives.has_directive;
      row.pr_author_login = Some(author_login.to_string());
      state.store.save_tracked_message(&row)?;
      row
    },
    | Some(mut row) => {
      if row.last_text != text {
        match api.update(target_channel, &row.message_ts, text) {
          | Ok(()) => {},
          | Err(e) if e.is_expected_noop() => {},
          | Err(e) => return Err(e.into()),
        }
        row.last_text = text.to_string();
        row.updated_at = chrono::Utc::now();
        state.store.save_tracked_message(&row)?;
      }
      row
    },
  };

  apply_terminal_reaction(state, api, &row, desired)
}

fn apply_terminal_reaction(state: &State, api: &crate::slack::Api, row: &TrackedMessage, desired: DesiredState) -> Result<()> {
  let want = desired.terminal_reaction();
  let emoji = |name: &str| match name {
    | "closed" => state.config.review_emoji.closed.clone(),
    | "merged" => state.config.review_emoji.merged.clone(),
    | other => other.to_string(),
  };

  if row.terminal_reaction.as_deref() != want {
    if let Some(prev) = &row.terminal_reaction {
      swallow_noop(api.remove(&row.channel_id, &row.message_ts, &emoji(prev)))?;
    }
    if let Some(next) = want {
      swallow_noop(api.add(&row.channel_id, &row.message_ts, &emoji(next)))?;
    }

    let mut row = row.clone();
    row.terminal_reaction = want.map(str::to_string);
    state.store.save_tracked_message(&row)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pr(draft: bool, merged: bool) -> PullRequest {
    PullRequest { number: 1,
                  title: "Add feature".into(),
                  body: None,
                  html_url: "https://github.com/o/r/pull/1".into(),
                  user: crate::github::Account { id: 1, login: "author".into() },
                  draft,
                  merged,
                  additions: 10,
                  deletions: 5 }
  }

  #[test]
  fn opened_draft_is_absent() {
    assert_eq!(classify("opened", &pr(true, false), &Directives::default()), DesiredState::Absent);
  }

  #[test]
  fn opened_non_draft_is_present_open() {
    assert_eq!(classify("opened", &pr(false, false), &Directives::default()), DesiredState::PresentOpen);
  }

  #[test]
  fn ready_for_review_is_present_open() {
    assert_eq!(classify("ready_for_review", &pr(false, false), &Directives::default()),
               DesiredState::PresentOpen);
  }

  #[test]
  fn closed_merged_is_terminal_merged() {
    assert_eq!(classify("closed", &pr(false, true), &Directives::default()),
               DesiredState::PresentTerminalMerged);
  }

  #[test]
  fn closed_not_merged_is_terminal_closed() {
    assert_eq!(classify("closed", &pr(false, false), &Directives::default()),
               DesiredState::PresentTerminalClosed);
  }

  #[test]
  fn reopened_is_present_open_even_after_terminal() {
    assert_eq!(classify("reopened", &pr(false, false), &Directives::default()), DesiredState::PresentOpen);
  }

  #[test]
  fn skip_directive_overrides_everything() {
    let mut d = Directives::default();
    d.skip = true;
    assert_eq!(classify("opened", &pr(false, false), &d), DesiredState::Absent);
  }

  #[test]
  fn desired_text_includes_size_emoji_title_and_author() {
    let d = Directives::default();
    let text = desired_text(&pr(false, false), &d, "@author", &[]);
    assert!(text.contains(":mouse:"));
    assert!(text.contains("Add feature"));
    assert!(text.contains("@author"));
  }

  #[test]
  fn custom_emoji_overrides_size_bucket() {
    let mut d = Directives::default();
    d.custom_emoji = Some("tada".into());
    let text = desired_text(&pr(false, false), &d, "@author", &[]);
    assert!(text.contains(":tada:"));
    assert!(!text.contains(":mouse:"));
  }

  #[test]
  fn cc_mentions_appended_when_present() {
    let d = Directives::default();
    let text = desired_text(&pr(false, false), &d, "@author", &["@alice".to_string()]);
    assert!(text.contains("(cc: @alice)"));
  }

  #[test]
  fn pr_payload_roundtrips_through_base64() {
    let p = pr(false, false);
    let encoded = WorkspacePrPayload::encode_pr(&p);
    let payload = WorkspacePrPayload { pr_number: 1,
                                       repo_full_name: "o/r".into(),
                                       workspace_id: "w".into(),
                                       pr_action: "opened".into(),
                                       github_user_id: 1,
                                       github_username: "author".into(),
                                       annotated_channel: None,
                                       pr_payload: encoded };
    assert_eq!(payload.decode_pr().unwrap(), p);
  }
}
