//! Inbound Events API payloads this crate acts on.

use serde::{Deserialize as De, Serialize as Ser};

/// Top-level inbound event envelope.
#[derive(Ser, De, Debug, Clone)]
#[serde(tag = "type")]
pub enum Event {
  /// Sent once at subscription time; the ingress echoes `challenge` back verbatim.
  #[serde(rename = "url_verification")]
  Challenge {
    challenge: String,
  },
  #[serde(rename = "event_callback")]
  Event {
    team_id: String,
    event: EventPayload,
  },
}

/// The inner event, discriminated by its own `type`.
#[derive(Ser, De, Debug, Clone)]
#[serde(tag = "type")]
pub enum EventPayload {
  #[serde(rename = "reaction_added")]
  ReactionAdded {
    user: String,
    reaction: String,
    item: ReactionItem,
  },
  #[serde(rename = "message")]
  Message {
    channel: String,
    ts: String,
    text: String,
    #[serde(default)]
    user: Option<String>,
    /// Present (any value) only on bot-authored messages.
    #[serde(default)]
    bot_id: Option<String>,
  },
  #[serde(other)]
  Other,
}

#[derive(Ser, De, Debug, Clone)]
#[serde(tag = "type")]
pub enum ReactionItem {
  #[serde(rename = "message")]
  Message {
    channel: String,
    ts: String,
  },
  #[serde(other)]
  Other,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn challenge_roundtrips() {
    let raw = serde_json::json!({"type": "url_verification", "challenge": "abc"});
    let ev: Event = serde_json::from_value(raw).unwrap();
    assert!(matches!(ev, Event::Challenge { challenge } if challenge == "abc"));
  }

  #[test]
  fn bot_message_has_bot_id() {
    let raw = serde_json::json!({
      "channel": "C1", "ts": "1.1", "text": "hi", "bot_id": "B1",
    });
    let ev: EventPayload = serde_json::from_value(raw).unwrap();
    assert!(matches!(ev, EventPayload::Message { bot_id: Some(_), .. }));
  }

  #[test]
  fn human_message_has_no_bot_id() {
    let raw = serde_json::json!({"channel": "C1", "ts": "1.1", "text": "hi", "user": "U1"});
    let ev: EventPayload = serde_json::from_value(raw).unwrap();
    assert!(matches!(ev, EventPayload::Message { bot_id: None, .. }));
  }
}
