//! In-process `DocStore` fake. Used by the CLI toolbox's dry-run mode and by every test in this
//! crate; behaviorally indistinguishable from a production store for everything this crate reads
//! or writes.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::mutex_extra::lock_discard_poison;
use crate::store::{DocStore, Result};

/// `collection -> id -> document`.
#[derive(Debug, Default)]
pub struct MemDocStore {
  collections: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemDocStore {
  pub fn new() -> Self {
    Self { collections: Mutex::new(HashMap::new()) }
  }
}

impl DocStore for MemDocStore {
  fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
    Ok(lock_discard_poison(&self.collections).get(collection).and_then(|c| c.get(id)).cloned())
  }

  fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
    lock_discard_poison(&self.collections).entry(collection.to_string())
                                          .or_insert_with(HashMap::new)
                                          .insert(id.to_string(), doc);
    Ok(())
  }

  fn delete(&self, collection: &str, id: &str) -> Result<()> {
    if let Some(c) = lock_discard_poison(&self.collections).get_mut(collection) {
      c.remove(id);
    }
    Ok(())
  }

  fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
    Ok(lock_discard_poison(&self.collections).get(collection)
                                             .map(|c| {
                                               c.values()
                                                .filter(|doc| doc.get(field) == Some(value))
                                                .cloned()
                                                .collect()
                                             })
                                             .unwrap_or_default())
  }

  fn all(&self, collection: &str) -> Result<Vec<Value>> {
    Ok(lock_discard_poison(&self.collections).get(collection)
                                             .map(|c| c.values().cloned().collect())
                                             .unwrap_or_default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn put_then_get_round_trips() {
    let store = MemDocStore::new();
    store.put("things", "1", json!({"a": 1})).unwrap();
    assert_eq!(store.get("things", "1").unwrap(), Some(json!({"a": 1})));
  }

  #[test]
  fn get_missing_is_none_not_error() {
    let store = MemDocStore::new();
    assert_eq!(store.get("things", "nope").unwrap(), None);
  }

  #[test]
  fn delete_missing_is_not_an_error() {
    let store = MemDocStore::new();
    assert!(store.delete("things", "nope").is_ok());
  }

  #[test]
  fn query_filters_by_field() {
    let store = MemDocStore::new();
    store.put("things", "1", json!({"owner": "a"})).unwrap();
    store.put("things", "2", json!({"owner": "b"})).unwrap();

    let found = store.query("things", "owner", &json!("a")).unwrap();
    assert_eq!(found, vec![json!({"owner": "a"})]);
  }

  #[test]
  fn all_returns_every_doc_in_collection() {
    let store = MemDocStore::new();
    store.put("things", "1", json!({"a": 1})).unwrap();
    store.put("things", "2", json!({"a": 2})).unwrap();
    store.put("other", "1", json!({"a": 3})).unwrap();

    assert_eq!(store.all("things").unwrap().len(), 2);
  }
}
