//! Posting, editing, and deleting chat messages.

use serde::{Deserialize as De, Serialize as Ser};

use super::{Api, Error, Result};

/// A channel+timestamp pair that uniquely identifies a message.
#[derive(PartialEq, Debug, Clone, Ser, De)]
pub struct Id {
  pub channel: String,
  pub ts: String,
}

#[derive(Debug, Clone, Ser, De)]
struct RepRaw {
  ok: bool,
  error: Option<String>,
  channel: Option<String>,
  ts: Option<String>,
}

/// A successful post/update response.
#[derive(Debug, PartialEq, Clone, Ser, De)]
pub struct Rep {
  pub id: Id,
}

impl Rep {
  fn try_from_raw(raw: RepRaw) -> Result<Rep> {
    let RepRaw { ts, channel, ok, error } = raw;

    match ok {
      | true => ts.ok_or_else(|| Error::Other("expected ts to be present".into()))
                  .and_then(|ts| {
                    channel.ok_or_else(|| Error::Other("expected channel to be present".into()))
                           .map(|channel| (channel, ts))
                  })
                  .map(|(channel, ts)| Id { channel, ts })
                  .map(|id| Rep { id }),
      | false => Err(Error::Platform(error.unwrap_or_else(|| "no error".into()))),
    }
  }
}

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

/// Post, edit, and remove chat messages.
pub trait Messages: 'static + Sync + Send + std::fmt::Debug {
  fn send(&self, channel_id: &str, text: &str) -> Result<Rep>;
  fn update(&self, channel_id: &str, ts: &str, text: &str) -> Result<()>;
  fn delete(&self, channel_id: &str, ts: &str) -> Result<()>;
}

impl Messages for Api {
  fn send(&self, channel_id: &str, text: &str) -> Result<Rep> {
    self.client
        .post(format!("{}/chat.postMessage", self.base_url))
        .json(&serde_json::json!({"channel": channel_id, "text": text}))
        .header("authorization", format!("Bearer {}", self.token))
        .send()
        .and_then(|rep| rep.error_for_status())
        .and_then(|rep| rep.json::<RepRaw>())
        .map_err(Error::Http)
        .and_then(Rep::try_from_raw)
  }

  fn update(&self, channel_id: &str, ts: &str, text: &str) -> Result<()> {
    self.client
        .post(format!("{}/chat.update", self.base_url))
        .json(&serde_json::json!({"channel": channel_id, "ts": ts, "text": text}))
        .header("authorization", format!("Bearer {}", self.token))
        .send()
        .and_then(|rep| rep.error_for_status())
        .and_then(|rep| rep.json::<OkRaw>())
        .map_err(Error::Http)
        .and_then(ok_or_platform_error)
  }

  fn delete(&self, channel_id: &str, ts: &str) -> Result<()> {
    self.client
        .post(format!("{}/chat.delete", self.base_url))
        .json(&serde_json::json!({"channel": channel_id, "ts": ts}))
        .header("authorization", format!("Bearer {}", self.token))
        .send()
        .and_then(|rep| rep.error_for_status())
        .and_then(|rep| rep.json::<OkRaw>())
        .map_err(Error::Http)
        .and_then(ok_or_platform_error)
  }
}
