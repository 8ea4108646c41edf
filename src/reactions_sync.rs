//! Reconciles the finite set of review-state reactions across every tracked message for a PR.

use serde::{Deserialize as De, Serialize as Ser};

use crate::github::{Client, ReviewState};
use crate::slack::reactions::{swallow_noop, Reactions};
use crate::store::{self, Installations, TrackedMessages};

#[derive(Debug)]
pub enum Error {
  Store(store::Error),
  GitHub(crate::github::client::Error),
  Slack(crate::slack::Error),
  NoInstallation,
}

impl From<store::Error> for Error {
  fn from(e: store::Error) -> Self {
    Error::Store(e)
  }
}
impl From<crate::github::client::Error> for Error {
  fn from(e: crate::github::client::Error) -> Self {
    Error::GitHub(e)
  }
}
impl From<crate::slack::Error> for Error {
  fn from(e: crate::slack::Error) -> Self {
    Error::Slack(e)
  }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Wire shape of a `reaction_sync` envelope payload.
#[derive(Clone, Debug, Ser, De)]
pub struct ReactionSyncPayload {
  pub repo_full_name: String,
  pub pr_number: u64,
  pub trace_id: String,
}

/// Fixed aggregation priority: changes-requested beats approved beats commented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AggregateState {
  ChangesRequested,
  Approved,
  Commented,
}

impl AggregateState {
  fn priority(self) -> u8 {
    match self {
      | AggregateState::ChangesRequested => 3,
      | AggregateState::Approved => 2,
      | AggregateState::Commented => 1,
    }
  }
}

struct ReviewerLatest {
  reviewer_login: String,
  is_author: bool,
  state: AggregateState,
}

/// Aggregate raw reviews into one state, applying PR-author comment filtering: a comment from the
/// PR's own author doesn't count unless no one else has commented either.
fn aggregate(reviews: &[crate::github::Review], pr_author_login: &str) -> Option<AggregateState> {
  use std::collections::HashMap;

  let mut latest: HashMap<String, ReviewerLatest> = HashMap::new();

  for review in reviews {
    let state = match review.state {
      | ReviewState::ChangesRequested => AggregateState::ChangesRequested,
      | ReviewState::Approved => AggregateState::Approved,
      | ReviewState::Commented => AggregateState::Commented,
      | ReviewState::Dismissed | ReviewState::Other => continue,
    };

    latest.insert(review.user.login.clone(),
                  ReviewerLatest { reviewer_login: review.user.login.clone(),
                                   is_author: review.user.login == pr_author_login,
                                   state });
  }

  let non_author_commented = latest.values().any(|r| !r.is_author && r.state == AggregateState::Commented);

  latest.values()
        .filter(|r| !(r.is_author && r.state == AggregateState::Commented && !non_author_commented))
        .map(|r| r.state)
        .max_by_key(|s| s.priority())
}

impl AggregateState {
  fn emoji(self, emoji: &crate::config::ReviewEmoji) -> String {
    match self {
      | AggregateState::ChangesRequested => emoji.changes_requested.clone(),
      | AggregateState::Approved => emoji.approved.clone(),
      | AggregateState::Commented => emoji.commented.clone(),
    }
  }
}

/// Entry point for a `reaction_sync` job.
pub fn handle(state: &crate::State, payload: &ReactionSyncPayload) -> Result<()> {
  let installation = state.store
                          .list_installations()?
                          .into_iter()
                          .find(|i| i.covers(&payload.repo_full_name))
                          .ok_or(Error::NoInstallation)?;

  let reviews = state.github_client.list_reviews(installation.id, &payload.repo_full_name, payload.pr_number)?;

  let rows = state.store.live_messages_for_pr(&payload.repo_full_name, payload.pr_number)?;
  if rows.is_empty() {
    return Ok(());
  }

  // Every live row for the same PR was posted for the same author; the reconciler stamps it at
  // creation time so this never needs a second code-host round trip.
  let pr_author_login = rows.first().and_then(|r| r.pr_author_login.as_deref()).unwrap_or("");
  let aggregate_state = aggregate(&reviews, pr_author_login);

  let all_review_emoji = [&state.config.review_emoji.approved,
                          &state.config.review_emoji.changes_requested,
                          &state.config.review_emoji.commented];

  for row in &rows {
    let workspace = match state.workspace_cache.get(&*state.store, &row.workspace_id)? {
      | Some(w) => w,
      | None => continue,
    };
    let api = state.slack_api(&workspace.bot_access_token);

    let desired_emoji = aggregate_state.map(|s| s.emoji(&state.config.review_emoji));

    for emoji in all_review_emoji {
      if Some(emoji) != desired_emoji.as_ref() {
        swallow_noop(api.remove(&row.channel_id, &row.message_ts, emoji))?;
      }
    }

    if let Some(emoji) = &desired_emoji {
      swallow_noop(api.add(&row.channel_id, &row.message_ts, emoji))?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::github::Account;

  fn review(login: &str, state: ReviewState) -> crate::github::Review {
    crate::github::Review { id: 1, user: Account { id: 1, login: login.into() }, state }
  }

  #[test]
  fn changes_requested_beats_approved() {
    let reviews = vec![review("a", ReviewState::Approved), review("b", ReviewState::ChangesRequested)];
    assert_eq!(aggregate(&reviews, "author"), Some(AggregateState::ChangesRequested));
  }

  #[test]
  fn dismissed_is_excluded() {
    let reviews = vec![review("a", ReviewState::Dismissed)];
    assert_eq!(aggregate(&reviews, "author"), None);
  }

  #[test]
  fn author_comment_excluded_when_alone() {
    let reviews = vec![review("author", ReviewState::Commented)];
    assert_eq!(aggregate(&reviews, "author"), None);
  }

  #[test]
  fn author_comment_included_when_another_reviewer_also_commented() {
    let reviews = vec![review("author", ReviewState::Commented), review("other", ReviewState::Commented)];
    assert_eq!(aggregate(&reviews, "author"), Some(AggregateState::Commented));
  }

  #[test]
  fn author_approval_always_counts() {
    let reviews = vec![review("author", ReviewState::Approved)];
    assert_eq!(aggregate(&reviews, "author"), Some(AggregateState::Approved));
  }

  #[test]
  fn order_independent_over_latest_per_user() {
    let a = vec![review("a", ReviewState::Commented), review("b", ReviewState::Approved)];
    let b = vec![review("b", ReviewState::Approved), review("a", ReviewState::Commented)];
    assert_eq!(aggregate(&a, "nobody"), aggregate(&b, "nobody"));
  }
}
