//! A chat-platform tenant with its own bot token and channel namespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize as De, Serialize as Ser};

use super::{get_typed, put_typed, all_typed, DocStore, Result};

const COLLECTION: &str = "slack_workspaces";

/// One installed chat tenant.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct Workspace {
  /// Stable tenant id (primary key).
  pub id: String,
  /// Human name, for logging/dashboards.
  pub name: String,
  /// Bot access token. The sole secret needed to act as the bot in this tenant; rotation replaces
  /// the row wholesale.
  pub bot_access_token: String,
  /// OAuth scopes granted at install time.
  pub scopes: Vec<String>,
  /// Chat user id of whoever installed the app.
  pub installer_user_id: String,
  pub installed_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Credential & Tenant Store lookups for `Workspace` rows.
pub trait Workspaces {
  fn get_workspace(&self, id: &str) -> Result<Option<Workspace>>;
  fn save_workspace(&self, ws: &Workspace) -> Result<()>;
  fn delete_workspace(&self, id: &str) -> Result<()>;
  fn list_workspaces(&self) -> Result<Vec<Workspace>>;
}

impl<T: DocStore + ?Sized> Workspaces for T {
  fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
    get_typed(self, COLLECTION, id)
  }

  fn save_workspace(&self, ws: &Workspace) -> Result<()> {
    put_typed(self, COLLECTION, &ws.id, ws)
  }

  fn delete_workspace(&self, id: &str) -> Result<()> {
    self.delete(COLLECTION, id)
  }

  fn list_workspaces(&self) -> Result<Vec<Workspace>> {
    all_typed(self, COLLECTION)
  }
}
