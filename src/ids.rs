//! Id and trace-id generation.

/// A fresh opaque id suitable for a document surrogate key or an envelope id.
pub fn new_id() -> String {
  nanoid::nanoid!()
}

/// A fresh trace id. Every enqueue operation carries one of these and it survives into all
/// downstream jobs and log lines.
pub fn new_trace_id() -> String {
  format!("trace_{}", nanoid::nanoid!())
}
