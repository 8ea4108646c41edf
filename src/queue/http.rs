//! Production queue adapter: hands the envelope to `/jobs/process` over HTTP, carrying the
//! envelope id, trace id, and shared-secret headers the dispatcher expects.
//!
//! The durability, retry, and backoff properties the adapter contract requires are provided by
//! whatever managed queue product fronts this deployment; this struct is the client side of that
//! contract, not a reimplementation of it.

use super::{Envelope, Error, Queue, Result};

#[derive(Debug)]
pub struct HttpQueue {
  dispatch_url: String,
  shared_secret: String,
  client: &'static reqwest::blocking::Client,
}

impl HttpQueue {
  pub fn new(base_url: &str, shared_secret: impl Into<String>, client: &'static reqwest::blocking::Client) -> Self {
    Self { dispatch_url: format!("{}/jobs/process", base_url.trim_end_matches('/')),
           shared_secret: shared_secret.into(),
           client }
  }
}

impl Queue for HttpQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    self.client
        .post(&self.dispatch_url)
        .header("X-Cloud-Tasks-Secret", &self.shared_secret)
        .header("X-Envelope-Id", &envelope.id)
        .header("X-Trace-Id", &envelope.trace_id)
        .json(&envelope)
        .send()
        .and_then(|rep| rep.error_for_status())
        .map(|_| ())
        .map_err(|e| Error::Backend(e.to_string()))
  }

  fn close(&self) {}
}
