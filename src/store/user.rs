//! A link between a chat-platform identity and a code-host identity.

use serde::{Deserialize as De, Serialize as Ser};

use super::{get_typed, put_typed, all_typed, query_typed, DocStore, Result};

const COLLECTION: &str = "users";

/// One code-host <-> chat-platform identity link.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct User {
  /// Code-host username (primary key).
  pub github_login: String,
  pub github_id: i64,
  pub slack_user_id: String,
  pub slack_team_id: String,
  pub default_channel: Option<String>,
  /// True only after out-of-band OAuth linking.
  pub verified: bool,
  pub notifications_enabled: bool,
  pub tagging_enabled: bool,
  /// Default true; whether this user can be `<@...>` mentioned at all.
  pub impersonation_enabled: bool,
}

impl User {
  /// Tagging a chat user in a message requires both `verified` and `tagging_enabled`.
  pub fn taggable(&self) -> bool {
    self.verified && self.tagging_enabled && self.impersonation_enabled
  }

  /// `<@chat_user_id>` when taggable, otherwise the plaintext code-host login.
  pub fn display(&self, fallback_login: &str) -> String {
    if self.taggable() {
      format!("<@{}>", self.slack_user_id)
    } else {
      format!("@{}", fallback_login)
    }
  }
}

/// Credential & Tenant Store lookups for `User` rows.
pub trait Users {
  fn get_user_by_login(&self, github_login: &str) -> Result<Option<User>>;
  fn get_user_by_github_id(&self, github_id: i64) -> Result<Option<User>>;
  fn get_user_by_slack_id(&self, slack_user_id: &str) -> Result<Option<User>>;
  fn save_user(&self, user: &User) -> Result<()>;
  fn delete_user(&self, github_login: &str) -> Result<()>;
}

impl<T: DocStore + ?Sized> Users for T {
  fn get_user_by_login(&self, github_login: &str) -> Result<Option<User>> {
    get_typed(self, COLLECTION, github_login)
  }

  fn get_user_by_github_id(&self, github_id: i64) -> Result<Option<User>> {
    Ok(query_typed::<User>(self, COLLECTION, "github_id", github_id)?.into_iter().next())
  }

  fn get_user_by_slack_id(&self, slack_user_id: &str) -> Result<Option<User>> {
    Ok(query_typed::<User>(self, COLLECTION, "slack_user_id", slack_user_id)?.into_iter().next())
  }

  fn save_user(&self, user: &User) -> Result<()> {
    put_typed(self, COLLECTION, &user.github_login, user)
  }

  fn delete_user(&self, github_login: &str) -> Result<()> {
    self.delete(COLLECTION, github_login)
  }
}

/// Allow listing all users without a dedicated index, used only by the CLI toolbox.
pub fn list_all(store: &(impl DocStore + ?Sized)) -> Result<Vec<User>> {
  all_typed(store, COLLECTION)
}
