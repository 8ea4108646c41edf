//! Chat-platform (Slack) integration: webhook admission, wire models, and outbound REST calls.

use hmac::{Hmac, Mac, NewMac};
use sha2::Sha256;

/// Event models
pub mod event;

/// Sending, updating, deleting messages
pub mod msg;

/// Adding/removing reactions
pub mod reactions;

/// Chat API result
pub type Result<T> = core::result::Result<T, self::Error>;

/// Errors encounterable by the chat API
#[derive(Debug)]
pub enum Error {
  /// Error sending, establishing http connection, deserializing, etc.
  Http(reqwest::Error),
  /// Chat platform got our request but didn't like it.
  Platform(String),
  /// Some other error.
  Other(String),
}

impl Error {
  /// `message_not_found`, `channel_not_found`, `already_reacted`, `no_reaction` are expected
  /// no-ops, not failures.
  pub fn is_expected_noop(&self) -> bool {
    match self {
      | Error::Platform(code) => matches!(code.as_str(),
                                           "message_not_found" | "channel_not_found" | "already_reacted" | "no_reaction"),
      | _ => false,
    }
  }
}

/// Represents the real chat-platform API, makes HTTP requests.
#[derive(Clone, Debug)]
pub struct Api {
  base_url: String,
  token: String,
  client: &'static reqwest::blocking::Client,
}

impl Api {
  /// Create a new instance scoped to one workspace's bot token.
  pub fn new(base_url: impl ToString, token: impl ToString, client: &'static reqwest::blocking::Client) -> Self {
    Self { base_url: base_url.to_string(),
           token: token.to_string(),
           client }
  }
}

type HmacSha256 = Hmac<Sha256>;

/// Validate an incoming chat-webhook request: HMAC-SHA256 over `v0:<ts>:<body>`, plus a timestamp
/// skew check.
pub fn request_authentic(signing_secret: &str,
                         max_age: std::time::Duration,
                         body: &[u8],
                         ts: &str,
                         inbound_sig: &str)
                         -> bool {
  let skew_ok = ts.parse::<i64>()
                  .ok()
                  .map(|sent| {
                    let now = chrono::Utc::now().timestamp();
                    (now - sent).unsigned_abs() < max_age.as_secs()
                  })
                  .unwrap_or(false);

  if !skew_ok {
    return false;
  }

  let base_string = [b"v0:", ts.as_bytes(), b":", body].concat();

  let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
    | Ok(m) => m,
    | Err(_) => return false,
  };
  mac.update(&base_string);

  let sig = match inbound_sig.strip_prefix("v0=").and_then(|h| hex::decode(h).ok()) {
    | Some(sig) => sig,
    | None => return false,
  };

  // `Mac::verify` does a constant-time comparison; a plain `==` on the decoded bytes would
  // short-circuit on the first mismatching byte.
  mac.verify(&sig).is_ok()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  fn sign(secret: &str, ts: &str, body: &[u8]) -> String {
    let base = [b"v0:", ts.as_bytes(), b":", body].concat();
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(&base);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
  }

  #[test]
  fn valid_request_within_skew_passes() {
    let ts = chrono::Utc::now().timestamp().to_string();
    let body = br#"{"a":1}"#;
    let sig = sign("shh", &ts, body);
    assert!(request_authentic("shh", Duration::from_secs(300), body, &ts, &sig));
  }

  #[test]
  fn stale_timestamp_rejected() {
    let ts = (chrono::Utc::now().timestamp() - 600).to_string();
    let body = br#"{"a":1}"#;
    let sig = sign("shh", &ts, body);
    assert!(!request_authentic("shh", Duration::from_secs(300), body, &ts, &sig));
  }

  #[test]
  fn wrong_secret_rejected() {
    let ts = chrono::Utc::now().timestamp().to_string();
    let body = br#"{"a":1}"#;
    let sig = sign("shh", &ts, body);
    assert!(!request_authentic("other", Duration::from_secs(300), body, &ts, &sig));
  }
}
