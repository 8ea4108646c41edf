//! Task queue adapter contract. The core depends only on `Queue`; an in-process
//! synchronous adapter and an HTTP production adapter are behaviorally indistinguishable to
//! everything above this module.

use serde::{Deserialize as De, Serialize as Ser};
use serde_json::Value;

pub mod http;
pub mod inprocess;

pub use http::HttpQueue;
pub use inprocess::InProcessQueue;

/// Discriminant for `JobEnvelope.payload`, also used to route a dequeued envelope to its handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Ser, De)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
  CodeHostWebhook,
  WorkspacePr,
  ManualPrLink,
  ReactionSync,
  DeleteTrackedMessage,
}

/// The queue-level wrapper around a unit of deferred work.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct Envelope {
  pub id: String,
  #[serde(rename = "type")]
  pub job_type: JobType,
  pub trace_id: String,
  pub payload: Value,
}

impl Envelope {
  pub fn new(job_type: JobType, trace_id: impl Into<String>, payload: Value) -> Self {
    Self { id: crate::ids::new_id(),
           job_type,
           trace_id: trace_id.into(),
           payload }
  }
}

#[derive(Debug)]
pub enum Error {
  Backend(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Durable append, at-least-once delivery, configurable backoff; the callback side of an
/// `enqueue` is an authenticated HTTP request to `/jobs/process` carrying the envelope.
pub trait Queue: 'static + Sync + Send + std::fmt::Debug {
  fn enqueue(&self, envelope: Envelope) -> Result<()>;
  fn close(&self);
}
