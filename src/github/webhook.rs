//! Code-host webhook admission: signature verification and event-shape filtering.

use hmac::{Hmac, Mac, NewMac};
use sha2::Sha256;

use super::models::{PullRequestEvent, PullRequestReviewEvent, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

/// Actions the fan-out planner cares about for `pull_request` events.
const PULL_REQUEST_ACTIONS: &[&str] = &["opened", "edited", "closed", "reopened", "ready_for_review"];

#[derive(Debug)]
pub enum Error {
  /// Body wasn't valid JSON for the claimed event type, or was missing a required field.
  MalformedInput(String),
}

/// Constant-time HMAC-SHA256 verification of `X-Hub-Signature-256: sha256=<hex>`.
pub fn request_authentic(secret: &str, body: &[u8], header_value: &str) -> bool {
  let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
    | Ok(m) => m,
    | Err(_) => return false,
  };
  mac.update(body);

  let sig = match header_value.strip_prefix("sha256=").and_then(|h| hex::decode(h).ok()) {
    | Some(sig) => sig,
    | None => return false,
  };

  // `Mac::verify` does a constant-time comparison; a plain `==` on the decoded bytes would
  // short-circuit on the first mismatching byte.
  mac.verify(&sig).is_ok()
}

/// Parse the body for a known, in-scope event type. `Ok(None)` means "acknowledge, don't enqueue"
/// (an event type or action we don't act on); `Err` means the body was malformed for the claimed
/// event type.
pub fn parse_event(event_type: &str, body: &[u8]) -> Result<Option<WebhookEvent>, Error> {
  match event_type {
    | "pull_request" => {
      let ev: PullRequestEvent =
        serde_json::from_slice(body).map_err(|e| Error::MalformedInput(e.to_string()))?;
      if PULL_REQUEST_ACTIONS.contains(&ev.action.as_str()) {
        Ok(Some(WebhookEvent::PullRequest(ev)))
      } else {
        Ok(None)
      }
    },
    | "pull_request_review" => {
      let ev: PullRequestReviewEvent =
        serde_json::from_slice(body).map_err(|e| Error::MalformedInput(e.to_string()))?;
      if ev.action == "submitted" {
        Ok(Some(WebhookEvent::PullRequestReview(ev)))
      } else {
        Ok(None)
      }
    },
    | _ => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
  }

  #[test]
  fn valid_signature_verifies() {
    let body = br#"{"a":1}"#;
    let sig = sign("shh", body);
    assert!(request_authentic("shh", body, &sig));
  }

  #[test]
  fn wrong_secret_rejected() {
    let body = br#"{"a":1}"#;
    let sig = sign("shh", body);
    assert!(!request_authentic("different", body, &sig));
  }

  #[test]
  fn tampered_body_rejected() {
    let body = br#"{"a":1}"#;
    let sig = sign("shh", body);
    assert!(!request_authentic("shh", br#"{"a":2}"#, &sig));
  }

  #[test]
  fn unrecognized_event_type_is_acked_not_enqueued() {
    assert!(parse_event("issues", br#"{}"#).unwrap().is_none());
  }

  #[test]
  fn pull_request_labeled_action_is_discarded() {
    let body = serde_json::json!({
      "action": "labeled",
      "pull_request": {"number": 1, "title": "t", "html_url": "u", "user": {"id": 1, "login": "a"}},
      "repository": {"id": 1, "full_name": "o/r"},
      "installation": null,
    });
    assert!(parse_event("pull_request", body.to_string().as_bytes()).unwrap().is_none());
  }

  #[test]
  fn pull_request_opened_is_accepted() {
    let body = serde_json::json!({
      "action": "opened",
      "pull_request": {"number": 1, "title": "t", "html_url": "u", "user": {"id": 1, "login": "a"}},
      "repository": {"id": 1, "full_name": "o/r"},
      "installation": null,
    });
    assert!(matches!(parse_event("pull_request", body.to_string().as_bytes()).unwrap(),
                      Some(WebhookEvent::PullRequest(_))));
  }

  #[test]
  fn malformed_body_is_an_error() {
    assert!(parse_event("pull_request", b"not json").is_err());
  }
}
