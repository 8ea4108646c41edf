//! Adding and removing emoji reactions on tracked messages: review-state reactions kept in sync
//! by the reaction synchronizer, and terminal-state reactions applied by the reconciler.

use serde::{Deserialize as De, Serialize as Ser};

use super::{Api, Error, Result};

#[derive(Debug, Clone, Ser, De)]
struct OkRaw {
  ok: bool,
  error: Option<String>,
}

fn ok_or_platform_error(raw: OkRaw) -> Result<()> {
  match raw.ok {
    | true => Ok(()),
    | false => Err(Error::Platform(raw.error.unwrap_or_else(|| "no error".into()))),
  }
}

/// Add/remove a named reaction (no colons) on a message.
pub trait Reactions: 'static + Sync + Send + std::fmt::Debug {
  fn add(&self, channel_id: &str, ts: &str, emoji_name: &str) -> Result<()>;
  fn remove(&self, channel_id: &str, ts: &str, emoji_name: &str) -> Result<()>;
}

impl Reactions for Api {
  fn add(&self, channel_id: &str, ts: &str, emoji_name: &str) -> Result<()> {
    self.client
        .post(format!("{}/reactions.add", self.base_url))
        .json(&serde_json::json!({"channel": channel_id, "timestamp": ts, "name": emoji_name}))
        .header("authorization", format!("Bearer {}", self.token))
        .send()
        .and_then(|rep| rep.error_for_status())
        .and_then(|rep| rep.json::<OkRaw>())
        .map_err(Error::Http)
        .and_then(ok_or_platform_error)
  }

  fn remove(&self, channel_id: &str, ts: &str, emoji_name: &str) -> Result<()> {
    self.client
        .post(format!("{}/reactions.remove", self.base_url))
        .json(&serde_json::json!({"channel": channel_id, "timestamp": ts, "name": emoji_name}))
        .header("authorization", format!("Bearer {}", self.token))
        .send()
        .and_then(|rep| rep.error_for_status())
        .and_then(|rep| rep.json::<OkRaw>())
        .map_err(Error::Http)
        .and_then(ok_or_platform_error)
  }
}

/// `add`/`remove` calls that hit an already-converged state are treated as success.
pub fn swallow_noop(result: Result<()>) -> Result<()> {
  match result {
    | Err(e) if e.is_expected_noop() => Ok(()),
    | other => other,
  }
}
