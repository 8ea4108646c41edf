//! In-process queue fake: invokes the dispatcher's handler synchronously. Used by tests and by
//! single-process deployments where a managed queue product is unnecessary overhead.

use super::{Envelope, Error, Queue, Result};

/// `Ok` means the handler returned 2xx (done); `Err` means 5xx (retry per backoff).
pub type Handler = Box<dyn Fn(&Envelope) -> core::result::Result<(), ()> + Send + Sync>;

pub struct InProcessQueue {
  handler: Handler,
  max_attempts: u32,
}

impl std::fmt::Debug for InProcessQueue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InProcessQueue").field("max_attempts", &self.max_attempts).finish()
  }
}

impl InProcessQueue {
  pub fn new(max_attempts: u32, handler: Handler) -> Self {
    Self { handler, max_attempts }
  }
}

impl Queue for InProcessQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    for attempt in 1..=self.max_attempts {
      match (self.handler)(&envelope) {
        | Ok(()) => return Ok(()),
        | Err(()) => {
          log::warn!("job {} (trace {}) attempt {}/{} failed",
                     envelope.id,
                     envelope.trace_id,
                     attempt,
                     self.max_attempts);
        },
      }
    }

    Err(Error::Backend(format!("job {} exhausted {} attempts", envelope.id, self.max_attempts)))
  }

  fn close(&self) {}
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  use serde_json::json;

  use super::*;
  use crate::queue::JobType;

  #[test]
  fn succeeds_on_first_try() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let q = InProcessQueue::new(3,
                                Box::new(move |_| {
                                  calls2.fetch_add(1, Ordering::SeqCst);
                                  Ok(())
                                }));

    q.enqueue(Envelope::new(JobType::ReactionSync, "t1", json!({}))).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn retries_then_exhausts() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let q = InProcessQueue::new(2,
                                Box::new(move |_| {
                                  calls2.fetch_add(1, Ordering::SeqCst);
                                  Err(())
                                }));

    let result = q.enqueue(Envelope::new(JobType::ReactionSync, "t1", json!({})));
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }
}
