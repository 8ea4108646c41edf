//! Minimal shapes for the subset of the GitHub REST/webhook payloads this crate reads.

use serde::{Deserialize as De, Serialize as Ser};

/// A GitHub account (user or org), as embedded in webhook payloads.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct Account {
  pub id: i64,
  pub login: String,
}

#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct Repository {
  pub id: i64,
  pub full_name: String,
}

/// The subset of a pull request's shape the reconciler needs.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  #[serde(default)]
  pub body: Option<String>,
  pub html_url: String,
  pub user: Account,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub merged: bool,
  #[serde(default)]
  pub additions: u64,
  #[serde(default)]
  pub deletions: u64,
}

#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct PullRequestEvent {
  pub action: String,
  pub pull_request: PullRequest,
  pub repository: Repository,
  pub installation: Option<InstallationRef>,
}

#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct InstallationRef {
  pub id: i64,
}

/// Review states as they appear on the wire (GitHub uses upper/mixed case; normalized on parse).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ser, De)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
  Approved,
  ChangesRequested,
  Commented,
  Dismissed,
  #[serde(other)]
  Other,
}

#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct Review {
  pub id: i64,
  pub user: Account,
  pub state: ReviewState,
}

#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct PullRequestReviewEvent {
  pub action: String,
  pub review: Review,
  pub pull_request: PullRequest,
  pub repository: Repository,
  pub installation: Option<InstallationRef>,
}

/// The two webhook event shapes this crate admits.
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookEvent {
  PullRequest(PullRequestEvent),
  PullRequestReview(PullRequestReviewEvent),
}
