//! In-memory credential cache fronting the workspace lookup.
//!
//! Warm reads never take a write lock. A cache miss falls through to the document store and
//! populates the cache; a write (install, token refresh, uninstall) invalidates the entry.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::store::{DocStore, Result, Workspace, Workspaces};

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
  lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
  lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Caches `Workspace` rows by id, since every inbound webhook and every outbound Slack call
/// resolves one.
#[derive(Debug, Default)]
pub struct WorkspaceCache {
  entries: RwLock<HashMap<String, Workspace>>,
}

impl WorkspaceCache {
  pub fn new() -> Self {
    Self { entries: RwLock::new(HashMap::new()) }
  }

  /// Read through to `store` on a miss, then populate the cache.
  pub fn get(&self, store: &(impl DocStore + ?Sized), workspace_id: &str) -> Result<Option<Workspace>> {
    if let Some(hit) = read(&self.entries).get(workspace_id).cloned() {
      return Ok(Some(hit));
    }

    let found = store.get_workspace(workspace_id)?;
    if let Some(ws) = &found {
      write(&self.entries).insert(workspace_id.to_string(), ws.clone());
    }

    Ok(found)
  }

  /// Drop a cached entry. Call after any write to the underlying row.
  pub fn invalidate(&self, workspace_id: &str) {
    write(&self.entries).remove(workspace_id);
  }

  /// Replace a cached entry in place, e.g. after a token refresh, without a store round trip.
  pub fn put(&self, workspace: Workspace) {
    write(&self.entries).insert(workspace.id.clone(), workspace);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::mem::MemDocStore;

  fn workspace(id: &str) -> Workspace {
    Workspace { id: id.to_string(),
                name: "acme".into(),
                bot_access_token: "xoxb-1".into(),
                scopes: vec![],
                installer_user_id: "U1".into(),
                installed_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now() }
  }

  #[test]
  fn caches_after_first_read() {
    let store = MemDocStore::new();
    store.save_workspace(&workspace("W1")).unwrap();

    let cache = WorkspaceCache::new();
    assert!(cache.get(&store, "W1").unwrap().is_some());

    store.delete_workspace("W1").unwrap();
    // still served from cache, proving the second read didn't touch the store
    assert!(cache.get(&store, "W1").unwrap().is_some());
  }

  #[test]
  fn invalidate_forces_reread() {
    let store = MemDocStore::new();
    store.save_workspace(&workspace("W1")).unwrap();

    let cache = WorkspaceCache::new();
    cache.get(&store, "W1").unwrap();

    store.delete_workspace("W1").unwrap();
    cache.invalidate("W1");

    assert!(cache.get(&store, "W1").unwrap().is_none());
  }
}
