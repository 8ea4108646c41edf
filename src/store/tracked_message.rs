//! The reconciler's memory of a single chat message referring to a specific PR.

use chrono::{DateTime, Utc};
use serde::{Deserialize as De, Serialize as Ser};

use super::{all_typed, put_typed, query_typed, DocStore, Result};
use crate::ids::new_id;

const COLLECTION: &str = "trackedmessages";

/// Where a tracked message came from.
#[derive(Clone, Copy, Debug, PartialEq, Ser, De)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
  /// Posted by the reconciler itself.
  Bot,
  /// Adopted from a human-pasted PR link.
  Manual,
}

/// One chat message the reconciler is responsible for keeping in sync with a PR.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct TrackedMessage {
  /// Surrogate id.
  pub id: String,
  pub workspace_id: String,
  pub channel_id: String,
  pub message_ts: String,
  pub repo_full_name: String,
  pub pr_number: u64,
  pub message_source: MessageSource,
  /// The PR author's code-host login, carried so the reaction synchronizer can apply PR-author
  /// comment filtering without a second code-host round trip. Absent for rows adopted by the
  /// manual-link tracker, which never learns the author.
  pub pr_author_login: Option<String>,
  /// Cc'd users, as rendered mentions or `@login` fallbacks.
  pub cc: Vec<String>,
  pub has_review_directive: bool,
  /// Set when the user reacted with the configured delete emoji. Rows with this flag never
  /// receive further reactions or message updates, and are never re-adopted.
  pub deleted_by_user: bool,
  /// The text most recently written to this message, used to detect no-op edits.
  pub last_text: String,
  /// The review-state reaction currently applied, if any.
  pub review_reaction: Option<String>,
  /// Whether a terminal (`closed`/`merged`) reaction is currently applied, and which.
  pub terminal_reaction: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TrackedMessage {
  pub fn new(workspace_id: impl Into<String>,
             channel_id: impl Into<String>,
             message_ts: impl Into<String>,
             repo_full_name: impl Into<String>,
             pr_number: u64,
             message_source: MessageSource,
             text: impl Into<String>)
             -> Self {
    let now = Utc::now();
    Self { id: new_id(),
           workspace_id: workspace_id.into(),
           channel_id: channel_id.into(),
           message_ts: message_ts.into(),
           repo_full_name: repo_full_name.into(),
           pr_number,
           message_source,
           pr_author_login: None,
           cc: Vec::new(),
           has_review_directive: false,
           deleted_by_user: false,
           last_text: text.into(),
           review_reaction: None,
           terminal_reaction: None,
           created_at: now,
           updated_at: now }
  }

  pub fn is_live(&self) -> bool {
    !self.deleted_by_user
  }
}

/// Credential & Tenant Store lookups for `TrackedMessage` rows.
pub trait TrackedMessages {
  /// Every non-deleted bot-posted row for a PR in one workspace, keyed by channel. This is the
  /// reconciler's `existing` set.
  fn live_bot_messages(&self, workspace_id: &str, repo_full_name: &str, pr_number: u64) -> Result<Vec<TrackedMessage>>;

  /// Every non-deleted tracked row for a PR across every workspace — the reaction synchronizer's
  /// target set.
  fn live_messages_for_pr(&self, repo_full_name: &str, pr_number: u64) -> Result<Vec<TrackedMessage>>;

  fn get_tracked_message(&self, workspace_id: &str, channel_id: &str, message_ts: &str) -> Result<Option<TrackedMessage>>;
  fn save_tracked_message(&self, msg: &TrackedMessage) -> Result<()>;
}

impl<T: DocStore + ?Sized> TrackedMessages for T {
  fn live_bot_messages(&self, workspace_id: &str, repo_full_name: &str, pr_number: u64) -> Result<Vec<TrackedMessage>> {
    Ok(all_for_pr(self, repo_full_name, pr_number)?.into_iter()
                                                   .filter(|m| {
                                                     m.workspace_id == workspace_id
                                                     && m.message_source == MessageSource::Bot
                                                     && m.is_live()
                                                   })
                                                   .collect())
  }

  fn live_messages_for_pr(&self, repo_full_name: &str, pr_number: u64) -> Result<Vec<TrackedMessage>> {
    Ok(all_for_pr(self, repo_full_name, pr_number)?.into_iter().filter(|m| m.is_live()).collect())
  }

  fn get_tracked_message(&self, workspace_id: &str, channel_id: &str, message_ts: &str) -> Result<Option<TrackedMessage>> {
    Ok(all_typed::<TrackedMessage>(self, COLLECTION)?.into_iter()
                                                     .find(|m| {
                                                       m.workspace_id == workspace_id
                                                       && m.channel_id == channel_id
                                                       && m.message_ts == message_ts
                                                     }))
  }

  fn save_tracked_message(&self, msg: &TrackedMessage) -> Result<()> {
    put_typed(self, COLLECTION, &msg.id, msg)
  }
}

fn all_for_pr(store: &(impl DocStore + ?Sized), repo_full_name: &str, pr_number: u64) -> Result<Vec<TrackedMessage>> {
  Ok(query_typed::<TrackedMessage>(store, COLLECTION, "repo_full_name", repo_full_name)?.into_iter()
                                                                                        .filter(|m| {
                                                                                          m.pr_number == pr_number
                                                                                        })
                                                                                        .collect())
}
