//! CSRF state tokens for the Slack OAuth install flow.
//!
//! Narrow: the core only touches this through the ingress path for Slack App-Home
//! install/OAuth callback, which is otherwise out of scope for this crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize as De, Serialize as Ser};

use super::{get_typed, put_typed, DocStore, Result};
use crate::ids::new_id;

const COLLECTION: &str = "oauth_states";
const MAX_AGE_MINUTES: i64 = 15;

/// One outstanding OAuth state token.
#[derive(Clone, Debug, PartialEq, Ser, De)]
pub struct OAuthState {
  pub token: String,
  pub created_at: DateTime<Utc>,
}

impl OAuthState {
  pub fn new() -> Self {
    Self { token: new_id(), created_at: Utc::now() }
  }

  pub fn expired(&self) -> bool {
    Utc::now() - self.created_at > Duration::minutes(MAX_AGE_MINUTES)
  }
}

/// Credential & Tenant Store lookups for `OAuthState` rows.
pub trait OAuthStates {
  fn save_oauth_state(&self, state: &OAuthState) -> Result<()>;

  /// Consumes the token: returns it only if present and unexpired, then deletes it regardless
  /// so a state token is never valid for more than one callback.
  fn take_oauth_state(&self, token: &str) -> Result<Option<OAuthState>>;
}

impl<T: DocStore + ?Sized> OAuthStates for T {
  fn save_oauth_state(&self, state: &OAuthState) -> Result<()> {
    put_typed(self, COLLECTION, &state.token, state)
  }

  fn take_oauth_state(&self, token: &str) -> Result<Option<OAuthState>> {
    let found = get_typed::<OAuthState>(self, COLLECTION, token)?;
    self.delete(COLLECTION, token)?;
    Ok(found.filter(|s| !s.expired()))
  }
}
