//! A GitHub App installation binding the bot to a set of repositories owned by an account.

use serde::{Deserialize as De, Serialize as Ser};

use super::{get_typed, put_typed, all_typed, query_typed, DocStore, Result};

const COLLECTION: &str = "github_installations";

/// Whether the installing account is a user or an organization.
#[derive(Clone, Copy, Debug, PartialEq, Ser, De)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
  User,
  Organization,
}

/// Whether the installation covers every repo on the account or an explicit allowlist.
#[derive(Clone, Copy, Debug, PartialEq, Ser, De)]
#[serde(rename_all = "lowercase")]
pub enum RepoSelection {
  All,
  Selected,
}

/// One GitHub App installation.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct CodeHostInstallation {
  /// Numeric installation id (primary key).
  pub id: i64,
  pub account_login: String,
  pub account_type: AccountType,
  pub repository_selection: RepoSelection,
  /// Only meaningful when `repository_selection == Selected`.
  pub repositories: Option<Vec<String>>,
  /// Workspace this installation's events are routed to.
  pub workspace_id: String,
  pub installer_login: String,
}

impl CodeHostInstallation {
  /// Is `repo_full_name` in scope for this installation?
  pub fn covers(&self, repo_full_name: &str) -> bool {
    match (self.repository_selection, &self.repositories) {
      | (RepoSelection::All, _) => true,
      | (RepoSelection::Selected, Some(repos)) => repos.iter().any(|r| r == repo_full_name),
      | (RepoSelection::Selected, None) => false,
    }
  }
}

/// Credential & Tenant Store lookups for `CodeHostInstallation` rows.
pub trait Installations {
  fn get_installation(&self, id: i64) -> Result<Option<CodeHostInstallation>>;
  fn find_installation(&self, account_login: &str, workspace_id: &str) -> Result<Option<CodeHostInstallation>>;
  fn save_installation(&self, installation: &CodeHostInstallation) -> Result<()>;
  fn delete_installation(&self, id: i64) -> Result<()>;
  fn list_installations(&self) -> Result<Vec<CodeHostInstallation>>;
}

impl<T: DocStore + ?Sized> Installations for T {
  fn get_installation(&self, id: i64) -> Result<Option<CodeHostInstallation>> {
    get_typed(self, COLLECTION, &id.to_string())
  }

  fn find_installation(&self, account_login: &str, workspace_id: &str) -> Result<Option<CodeHostInstallation>> {
    Ok(query_typed::<CodeHostInstallation>(self, COLLECTION, "account_login", account_login)?
        .into_iter()
        .find(|i| i.workspace_id == workspace_id))
  }

  fn save_installation(&self, installation: &CodeHostInstallation) -> Result<()> {
    put_typed(self, COLLECTION, &installation.id.to_string(), installation)
  }

  fn delete_installation(&self, id: i64) -> Result<()> {
    self.delete(COLLECTION, &id.to_string())
  }

  fn list_installations(&self) -> Result<Vec<CodeHostInstallation>> {
    all_typed(self, COLLECTION)
  }
}
