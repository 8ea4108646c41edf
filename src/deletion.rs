//! Detects the configured "delete" reaction and suppresses future reconciliation of that message.

use serde::{Deserialize as De, Serialize as Ser};

use crate::slack::msg::Messages;
use crate::store::{self, TrackedMessages};

#[derive(Debug)]
pub enum Error {
  Store(store::Error),
  Slack(crate::slack::Error),
}

impl From<store::Error> for Error {
  fn from(e: store::Error) -> Self {
    Error::Store(e)
  }
}
impl From<crate::slack::Error> for Error {
  fn from(e: crate::slack::Error) -> Self {
    Error::Slack(e)
  }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Wire shape of a `delete_tracked_message` envelope payload.
#[derive(Clone, Debug, Ser, De)]
pub struct DeleteTrackedMessagePayload {
  pub slack_channel: String,
  pub slack_message_ts: String,
  pub slack_team_id: String,
  pub trace_id: String,
}

/// Entry point for a `delete_tracked_message` job.
pub fn handle(state: &crate::State, payload: &DeleteTrackedMessagePayload) -> Result<()> {
  let workspace_id = &payload.slack_team_id;

  let mut row = match state.store.get_tracked_message(workspace_id, &payload.slack_channel, &payload.slack_message_ts)? {
    | Some(row) => row,
    | None => return Ok(()),
  };

  row.deleted_by_user = true;
  state.store.save_tracked_message(&row)?;

  if let Some(workspace) = state.workspace_cache.get(&*state.store, workspace_id)? {
    let api = state.slack_api(&workspace.bot_access_token);
    match api.delete(&payload.slack_channel, &payload.slack_message_ts) {
      | Ok(()) => {},
      | Err(e) if e.is_expected_noop() => {},
      | Err(e) => return Err(e.into()),
    }
  }

  Ok(())
}
