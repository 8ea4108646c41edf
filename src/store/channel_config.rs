//! Per-channel toggle for manual-PR-link tracking.

use serde::{Deserialize as De, Serialize as Ser};

use super::{get_typed, put_typed, DocStore, Result};

const COLLECTION: &str = "channel_configs";

/// One channel's configuration within a workspace. Absence means defaults (manual tracking off).
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct ChannelConfig {
  pub workspace_id: String,
  pub channel_id: String,
  pub manual_tracking_enabled: bool,
}

impl ChannelConfig {
  /// Composite primary key `{workspace}#{channel_id}`.
  pub fn id(workspace_id: &str, channel_id: &str) -> String {
    format!("{}#{}", workspace_id, channel_id)
  }
}

/// Credential & Tenant Store lookups for `ChannelConfig` rows.
pub trait ChannelConfigs {
  fn get_channel_config(&self, workspace_id: &str, channel_id: &str) -> Result<Option<ChannelConfig>>;
  fn save_channel_config(&self, cfg: &ChannelConfig) -> Result<()>;

  /// Manual tracking is opt-in; absence of a row means disabled.
  fn manual_tracking_enabled(&self, workspace_id: &str, channel_id: &str) -> Result<bool> {
    Ok(self.get_channel_config(workspace_id, channel_id)?
           .map(|c| c.manual_tracking_enabled)
           .unwrap_or(false))
  }
}

impl<T: DocStore + ?Sized> ChannelConfigs for T {
  fn get_channel_config(&self, workspace_id: &str, channel_id: &str) -> Result<Option<ChannelConfig>> {
    get_typed(self, COLLECTION, &ChannelConfig::id(workspace_id, channel_id))
  }

  fn save_channel_config(&self, cfg: &ChannelConfig) -> Result<()> {
    put_typed(self, COLLECTION, &ChannelConfig::id(&cfg.workspace_id, &cfg.channel_id), cfg)
  }
}
