//! Maps `(workspace, repo_full_name)` to one chat channel.

use serde::{Deserialize as De, Serialize as Ser};

use super::{escape_repo, get_typed, put_typed, query_typed, DocStore, Result};

const COLLECTION: &str = "repos";

/// One workspace's subscription to a repo's PR notifications.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct RepoSubscription {
  pub workspace_id: String,
  pub repo_full_name: String,
  pub channel_id: String,
  pub enabled: bool,
}

impl RepoSubscription {
  /// Composite primary key `{workspace}#{url-escape repo full name}`.
  pub fn id(workspace_id: &str, repo_full_name: &str) -> String {
    format!("{}#{}", workspace_id, escape_repo(repo_full_name))
  }
}

/// Credential & Tenant Store lookups for `RepoSubscription` rows.
pub trait RepoSubscriptions {
  fn get_subscription(&self, workspace_id: &str, repo_full_name: &str) -> Result<Option<RepoSubscription>>;
  /// All enabled subscriptions across every workspace for one repo — the fan-out planner's join.
  fn subscriptions_for_repo(&self, repo_full_name: &str) -> Result<Vec<RepoSubscription>>;
  fn save_subscription(&self, sub: &RepoSubscription) -> Result<()>;
  fn delete_subscription(&self, workspace_id: &str, repo_full_name: &str) -> Result<()>;
}

impl<T: DocStore + ?Sized> RepoSubscriptions for T {
  fn get_subscription(&self, workspace_id: &str, repo_full_name: &str) -> Result<Option<RepoSubscription>> {
    get_typed(self, COLLECTION, &RepoSubscription::id(workspace_id, repo_full_name))
  }

  fn subscriptions_for_repo(&self, repo_full_name: &str) -> Result<Vec<RepoSubscription>> {
    Ok(query_typed::<RepoSubscription>(self, COLLECTION, "repo_full_name", repo_full_name)?.into_iter()
                                                                                           .filter(|s| s.enabled)
                                                                                           .collect())
  }

  fn save_subscription(&self, sub: &RepoSubscription) -> Result<()> {
    put_typed(self,
              COLLECTION,
              &RepoSubscription::id(&sub.workspace_id, &sub.repo_full_name),
              sub)
  }

  fn delete_subscription(&self, workspace_id: &str, repo_full_name: &str) -> Result<()> {
    self.delete(COLLECTION, &RepoSubscription::id(workspace_id, repo_full_name))
  }
}
