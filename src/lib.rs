#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code, missing_copy_implementations))]

use std::sync::Arc;

/// Helper result methods
pub mod result_extra;

/// Helper mutex functions
pub mod mutex_extra;

/// Id and trace-id generation
pub mod ids;

/// Boot-time configuration
pub mod config;

/// Document-store abstraction and entity lookups
pub mod store;

/// Author-directive parsing
pub mod directives;

/// Line-delta size-bucket emoji lookup
pub mod size;

/// Code-host (GitHub) integration
pub mod github;

/// Chat-platform (Slack) integration
pub mod slack;

/// Task queue adapter
pub mod queue;

/// The PR reconciler
pub mod reconciler;

/// Review-state reaction synchronizer
pub mod reactions_sync;

/// Manual PR-link tracker
pub mod manual_link;

/// User-deletion watcher
pub mod deletion;

/// Fan-out planner
pub mod fanout;

/// Job dispatcher
pub mod dispatcher;

pub use config::Config;

// I chose to use dyn boxes rather than generics here for code footprint and code footprint alone.
// If scale was a concern, I would want to change:
//   `State {t: Box<dyn Trait>}`
// to
//   `State<T: Trait> {trait: T}`
/// App environment: every trait-object dependency the request/job handlers read from.
#[derive(Debug)]
pub struct State {
  pub config: Config,
  /// Document store backing every entity lookup.
  pub store: Box<dyn store::DocStore>,
  /// Task queue adapter.
  pub queue: Box<dyn queue::Queue>,
  /// Code-host REST client, scoped per installation.
  pub github_client: Box<dyn github::Client>,
  /// HTTP request client shared across outbound Slack/GitHub calls.
  pub reqwest_client: &'static reqwest::blocking::Client,
  /// Read-through workspace credential cache.
  pub workspace_cache: store::cache::WorkspaceCache,
}

impl State {
  /// A Slack API client scoped to one workspace's bot token.
  pub fn slack_api(&self, bot_access_token: &str) -> slack::Api {
    slack::Api::new(&self.config.slack_api_base_url, bot_access_token, self.reqwest_client)
  }
}

lazy_static::lazy_static! {
  pub static ref CLIENT: reqwest::blocking::Client = reqwest::blocking::Client::new();

  pub static ref STATE: Arc<State> = {
    let config = Config::from_env().unwrap_or_else(|e| panic!("{}", e.0));

    // Swap for a real `DocStore` impl against the configured store project/database in a
    // production deployment; the in-process fake is wired here only so the binary boots standalone.
    let store: Box<dyn store::DocStore> = Box::new(store::mem::MemDocStore::new());

    let github_client: Box<dyn github::Client> =
      Box::new(github::ClientCache::new(config.github_app_id.clone(),
                                        config.github_app_private_key.clone(),
                                        &CLIENT));

    let queue: Box<dyn queue::Queue> =
      Box::new(queue::HttpQueue::new(&config.base_url, config.cloud_tasks_secret.clone(), &CLIENT));

    Arc::new(State { config,
                     store,
                     queue,
                     github_client,
                     reqwest_client: &CLIENT,
                     workspace_cache: store::cache::WorkspaceCache::new() })
  };
}
