//! Boot-time configuration, read once from the environment.
//!
//! One fallible constructor gathers every variable so a single missing var produces one
//! actionable error instead of a panic mid-request.

use std::{env, time::Duration};

/// Everything the process needs to know before it can serve a request.
#[derive(Debug, Clone)]
pub struct Config {
  /// Document store project, e.g. the managed Firestore-like project id.
  pub store_project_id: String,
  /// Document store database id within the project.
  pub store_database_id: String,
  /// Shared secret GitHub signs webhook deliveries with.
  pub github_webhook_secret: String,
  /// GitHub App id, used as the JWT `iss` claim when minting installation tokens.
  pub github_app_id: String,
  /// GitHub App private key, PEM-encoded, used to sign the app-level JWT.
  pub github_app_private_key: String,
  /// Shared secret Slack signs event deliveries with.
  pub slack_signing_secret: String,
  /// Shared secret the task queue's worker callback must present.
  pub cloud_tasks_secret: String,
  /// Publicly reachable base URL of this deployment, used to address the worker callback.
  pub base_url: String,
  /// Deadline applied to a single job invocation.
  pub webhook_processing_timeout: Duration,
  /// Maximum age of a Slack request timestamp before it's treated as a replay.
  pub slack_timestamp_max_age: Duration,
  /// Maximum queue delivery attempts before a job is abandoned.
  pub cloud_tasks_max_attempts: u32,
  /// Address the HTTP server binds to.
  pub bind_addr: String,
  /// Emoji name (no colons) used to recognize a "delete this" reaction.
  pub delete_reaction_emoji: String,
  /// Review-state -> emoji-name mapping.
  pub review_emoji: ReviewEmoji,
  /// Optional single-workspace bootstrap token, seeds a default `Workspace` row on first boot.
  pub slack_api_token: Option<String>,
  /// Base URL the chat API client posts to. Overridable so tests can point it at a mock server.
  pub slack_api_base_url: String,
}

/// The configurable review-state emoji table, with the documented defaults.
#[derive(Debug, Clone)]
pub struct ReviewEmoji {
  pub approved: String,
  pub changes_requested: String,
  pub commented: String,
  pub merged: String,
  pub closed: String,
}

impl Default for ReviewEmoji {
  fn default() -> Self {
    Self { approved: "white_check_mark".into(),
           changes_requested: "arrows_counterclockwise".into(),
           commented: "speech_balloon".into(),
           merged: "purple_heart".into(),
           closed: "x".into() }
  }
}

/// Error produced when required configuration is missing or malformed.
#[derive(Debug)]
pub struct Error(pub String);

fn required(name: &str) -> Result<String, Error> {
  env::var(name).map_err(|_| Error(format!("{} required", name)))
}

fn optional_with_default(name: &str, default: &str) -> String {
  env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_duration_secs(name: &str, default_secs: u64) -> Duration {
  env::var(name).ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(|| Duration::from_secs(default_secs))
}

impl Config {
  /// Load configuration from the environment. Fails fast, listing the first missing required var.
  pub fn from_env() -> Result<Self, Error> {
    Ok(Self { store_project_id: required("FIRESTORE_PROJECT_ID")?,
              store_database_id: required("FIRESTORE_DATABASE_ID")?,
              github_webhook_secret: required("GITHUB_WEBHOOK_SECRET")?,
              github_app_id: required("GITHUB_APP_ID")?,
              github_app_private_key: required("GITHUB_APP_PRIVATE_KEY")?,
              slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
              cloud_tasks_secret: required("CLOUD_TASKS_SECRET")?,
              base_url: required("BASE_URL")?,
              webhook_processing_timeout:
                optional_duration_secs("WEBHOOK_PROCESSING_TIMEOUT", 300),
              slack_timestamp_max_age: optional_duration_secs("SLACK_TIMESTAMP_MAX_AGE", 300),
              cloud_tasks_max_attempts: env::var("CLOUD_TASKS_MAX_ATTEMPTS").ok()
                                                                            .and_then(|v| v.parse().ok())
                                                                            .unwrap_or(5),
              bind_addr: optional_with_default("SERVER_BIND_ADDR", "127.0.0.1:3030"),
              delete_reaction_emoji: optional_with_default("DELETE_REACTION_EMOJI", "wastebasket"),
              review_emoji:
                ReviewEmoji { approved: optional_with_default("REVIEW_EMOJI_APPROVED", "white_check_mark"),
                              changes_requested:
                                optional_with_default("REVIEW_EMOJI_CHANGES_REQUESTED",
                                                       "arrows_counterclockwise"),
                              commented: optional_with_default("REVIEW_EMOJI_COMMENTED", "speech_balloon"),
                              merged: optional_with_default("REVIEW_EMOJI_MERGED", "purple_heart"),
                              closed: optional_with_default("REVIEW_EMOJI_CLOSED", "x") },
              slack_api_token: env::var("SLACK_API_TOKEN").ok(),
              slack_api_base_url: optional_with_default("SLACK_API_BASE_URL", "https://slack.com/api") })
  }
}

fn init_logger() {
  if env::var_os("RUST_LOG").is_none() {
    env::set_var("RUST_LOG", "prbridge=debug");
  }

  pretty_env_logger::try_init().ok();
}

/// Load `.env`, initialize the logger. Idempotent enough to call from both binaries and tests.
pub fn bootstrap() {
  dotenv::dotenv().ok();
  init_logger();
}
