//! Document-store abstraction the rest of the crate depends on.
//!
//! One trait per capability, swappable implementation: the core never depends on a concrete
//! database client, only on `DocStore`. `mem::MemDocStore` stands in for the managed document
//! database in tests and in the CLI toolbox; a production deployment supplies its own `DocStore`
//! impl.

use serde::{de::DeserializeOwned, Serialize};

pub mod cache;
pub mod channel_config;
pub mod installation;
pub mod mem;
pub mod oauth_state;
pub mod repo_subscription;
pub mod tracked_message;
pub mod user;
pub mod workspace;

pub use channel_config::{ChannelConfig, ChannelConfigs};
pub use installation::{AccountType, CodeHostInstallation, Installations, RepoSelection};
pub use oauth_state::{OAuthState, OAuthStates};
pub use repo_subscription::{RepoSubscription, RepoSubscriptions};
pub use tracked_message::{MessageSource, TrackedMessage, TrackedMessages};
pub use user::{User, Users};
pub use workspace::{Workspace, Workspaces};

/// Errors a document store operation may fail with.
#[derive(Debug)]
pub enum Error {
  /// The backing store could not be reached, or returned malformed data.
  Backend(String),
  /// A document existed but didn't deserialize into the expected shape.
  Corrupt(String),
}

/// Document store result.
pub type Result<T> = core::result::Result<T, Error>;

/// A collection of JSON documents keyed by string id, with single-document atomic writes, point
/// reads, and filtered queries over indexed fields. No multi-document transactions.
pub trait DocStore: 'static + Sync + Send + std::fmt::Debug {
  /// Point read by id.
  fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>>;
  /// Atomic single-document write (create or replace).
  fn put(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<()>;
  /// Delete by id. Deleting an absent document is not an error.
  fn delete(&self, collection: &str, id: &str) -> Result<()>;
  /// Filtered query over one indexed field.
  fn query(&self, collection: &str, field: &str, value: &serde_json::Value) -> Result<Vec<serde_json::Value>>;
  /// Every document in a collection. Used sparingly (fan-out, CLI dumps).
  fn all(&self, collection: &str) -> Result<Vec<serde_json::Value>>;
}

pub(crate) fn get_typed<T: DeserializeOwned>(store: &(impl DocStore + ?Sized),
                                             collection: &str,
                                             id: &str)
                                             -> Result<Option<T>> {
  store.get(collection, id)?
       .map(|v| serde_json::from_value(v).map_err(|e| Error::Corrupt(e.to_string())))
       .transpose()
}

pub(crate) fn put_typed<T: Serialize>(store: &(impl DocStore + ?Sized), collection: &str, id: &str, doc: &T) -> Result<()> {
  let v = serde_json::to_value(doc).map_err(|e| Error::Corrupt(e.to_string()))?;
  store.put(collection, id, v)
}

pub(crate) fn query_typed<T: DeserializeOwned>(store: &(impl DocStore + ?Sized),
                                               collection: &str,
                                               field: &str,
                                               value: impl Serialize)
                                               -> Result<Vec<T>> {
  let value = serde_json::to_value(value).map_err(|e| Error::Corrupt(e.to_string()))?;
  store.query(collection, field, &value)?
       .into_iter()
       .map(|v| serde_json::from_value(v).map_err(|e| Error::Corrupt(e.to_string())))
       .collect()
}

pub(crate) fn all_typed<T: DeserializeOwned>(store: &(impl DocStore + ?Sized), collection: &str) -> Result<Vec<T>> {
  store.all(collection)?
       .into_iter()
       .map(|v| serde_json::from_value(v).map_err(|e| Error::Corrupt(e.to_string())))
       .collect()
}

/// Percent-escape a repo full name (`owner/repo`) for use in a composite document id
/// (`{workspace}#{url-escape repo full name}`).
pub fn escape_repo(full_name: &str) -> String {
  urlencoding::encode(full_name).into_owned()
}
