//! Routes an envelope to its handler and translates handler failure into the 5xx the task queue
//! retries against.

use crate::queue::{Envelope, JobType};
use crate::result_extra::ResultExtra;
use crate::{deletion, fanout, manual_link, reactions_sync, reconciler, State};

#[derive(Debug)]
pub enum Error {
  MalformedPayload(String),
  Handler(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Constant-time comparison for the `X-Cloud-Tasks-Secret` header.
pub fn secret_matches(configured: &str, provided: &str) -> bool {
  let configured = configured.as_bytes();
  let provided = provided.as_bytes();

  if configured.len() != provided.len() {
    return false;
  }

  configured.iter().zip(provided).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Route one envelope by `job_type` to its handler. `Ok` terminates the envelope; `Err` is
/// 5xx-worthy and drives queue retry.
pub fn dispatch(state: &State, envelope: &Envelope) -> Result<()> {
  macro_rules! decode {
    ($ty:ty) => {
      serde_json::from_value::<$ty>(envelope.payload.clone()).map_err(|e| Error::MalformedPayload(e.to_string()))?
    };
  }

  log::debug!("[{}] dispatching {:?} job {}", envelope.trace_id, envelope.job_type, envelope.id);

  let result = match envelope.job_type {
    | JobType::CodeHostWebhook => {
      let payload = decode!(fanout::CodeHostWebhookPayload);
      fanout::handle(state, &payload).map_err(|e| Error::Handler(format!("{:?}", e)))
    },
    | JobType::WorkspacePr => {
      let payload = decode!(reconciler::WorkspacePrPayload);
      reconciler::handle(state, &payload).map_err(|e| Error::Handler(format!("{:?}", e)))
    },
    | JobType::ManualPrLink => {
      let payload = decode!(manual_link::ManualPrLinkPayload);
      manual_link::handle(state, &payload).map_err(|e| Error::Handler(format!("{:?}", e)))
    },
    | JobType::ReactionSync => {
      let payload = decode!(reactions_sync::ReactionSyncPayload);
      reactions_sync::handle(state, &payload).map_err(|e| Error::Handler(format!("{:?}", e)))
    },
    | JobType::DeleteTrackedMessage => {
      let payload = decode!(deletion::DeleteTrackedMessagePayload);
      deletion::handle(state, &payload).map_err(|e| Error::Handler(format!("{:?}", e)))
    },
  };

  result.tap(|_| log::info!("[{}] job {} done", envelope.trace_id, envelope.id))
        .tap_err(|e| log::warn!("[{}] job {} failed: {:?}", envelope.trace_id, envelope.id, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_secrets_match() {
    assert!(secret_matches("shh", "shh"));
  }

  #[test]
  fn different_secrets_of_same_length_reject() {
    assert!(!secret_matches("shhh", "shhx"));
  }

  #[test]
  fn different_lengths_reject() {
    assert!(!secret_matches("shh", "shhh"));
  }
}
