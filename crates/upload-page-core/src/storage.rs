use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::PageConfig;

/// Key of the partition shared by every route.
pub const GLOBAL_PARTITION_KEY: &str = "_global";

/// The App's view of durable state: the shared partition plus this route's partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    pub global: Option<Value>,
    #[serde(default)]
    pub local: Option<Value>,
}

impl StoredState {
    pub fn new(global: Option<Value>, local: Option<Value>) -> Self {
        Self { global, local }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("stored value under '{key}' is not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value under '{key}' is not a JSON object")]
    NotAnObject { key: String },
    #[error("failed to encode stored value: {0}")]
    Encode(#[source] serde_json::Error),
}

/// String key/value storage with the semantics of the browser's `localStorage`.
pub trait KeyValueStore {
    type Error: std::fmt::Display;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;
}

/// A storage notification raised by another execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageChange<'a> {
    /// Whether the notification concerns the same storage area the store writes to.
    pub same_area: bool,
    /// `None` when the whole area was cleared.
    pub key: Option<&'a str>,
    pub new_value: Option<&'a str>,
}

/// One JSON object under a single key, partitioned into `_global` and one entry per
/// route path.
pub struct PersistentStore<S> {
    backend: S,
    key: String,
    route_path: String,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(backend: S, key: impl Into<String>, page: &PageConfig) -> Self {
        Self {
            backend,
            key: key.into(),
            route_path: page.route_path().to_string(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn load(&self) -> Result<StoredState, StorageError> {
        let raw = self
            .backend
            .get_item(&self.key)
            .map_err(|error| StorageError::Backend(error.to_string()))?;
        self.project_raw(raw.as_deref())
    }

    /// Writes `value` into the global partition and this route's partition, keeping
    /// every other route's partition. `None` deletes the whole slot.
    pub fn store(&self, value: Option<&StoredState>) -> Result<(), StorageError> {
        let Some(value) = value else {
            tracing::debug!(key = %self.key, "clearing stored app state");
            return self
                .backend
                .remove_item(&self.key)
                .map_err(|error| StorageError::Backend(error.to_string()));
        };

        let raw = self
            .backend
            .get_item(&self.key)
            .map_err(|error| StorageError::Backend(error.to_string()))?;
        let mut all = match raw.as_deref() {
            Some(raw) => self.decode_object(raw)?,
            None => Map::new(),
        };

        all.insert(
            GLOBAL_PARTITION_KEY.to_string(),
            value.global.clone().unwrap_or(Value::Null),
        );
        all.insert(
            self.route_path.clone(),
            value.local.clone().unwrap_or(Value::Null),
        );

        let serialized = serde_json::to_string(&Value::Object(all)).map_err(StorageError::Encode)?;
        self.backend
            .set_item(&self.key, &serialized)
            .map_err(|error| StorageError::Backend(error.to_string()))
    }

    /// Projects a notification from another context. Returns `Ok(None)` for changes to
    /// other areas or keys.
    pub fn project_change(
        &self,
        change: &StorageChange<'_>,
    ) -> Result<Option<StoredState>, StorageError> {
        if !change.same_area || change.key != Some(self.key.as_str()) {
            return Ok(None);
        }
        self.project_raw(change.new_value).map(Some)
    }

    /// The `null`-or-split projection shared by `load` and change notifications.
    pub fn project_raw(&self, raw: Option<&str>) -> Result<StoredState, StorageError> {
        let Some(raw) = raw else {
            return Ok(StoredState::empty());
        };
        let all = self.decode_object(raw)?;
        Ok(StoredState {
            global: partition(&all, GLOBAL_PARTITION_KEY),
            local: partition(&all, &self.route_path),
        })
    }

    fn decode_object(&self, raw: &str) -> Result<Map<String, Value>, StorageError> {
        let value: Value = serde_json::from_str(raw).map_err(|source| StorageError::Decode {
            key: self.key.clone(),
            source,
        })?;
        match value {
            Value::Object(all) => Ok(all),
            // A literal `null` is what a cleared slot looks like to older writers.
            Value::Null => Ok(Map::new()),
            _ => Err(StorageError::NotAnObject {
                key: self.key.clone(),
            }),
        }
    }
}

fn partition(all: &Map<String, Value>, key: &str) -> Option<Value> {
    all.get(key).filter(|value| !value.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        items: RefCell<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl KeyValueStore for &MemoryStore {
        type Error = String;

        fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.items.borrow().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err("quota exceeded".to_string());
            }
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
            self.items.borrow_mut().remove(key);
            Ok(())
        }
    }

    fn store_for<'a>(backend: &'a MemoryStore, route: &str) -> PersistentStore<&'a MemoryStore> {
        let page = PageConfig::new(route, "Page").expect("page config");
        PersistentStore::new(backend, "app", &page)
    }

    fn raw_blob(backend: &MemoryStore) -> Value {
        let raw = backend.items.borrow().get("app").cloned().expect("slot present");
        serde_json::from_str(&raw).expect("slot holds json")
    }

    #[test]
    fn load_without_slot_is_empty_state() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        assert_eq!(store.load().expect("load"), StoredState::empty());
    }

    #[test]
    fn load_treats_missing_partitions_as_null() {
        let backend = MemoryStore::default();
        backend
            .items
            .borrow_mut()
            .insert("app".to_string(), r#"{"other/page":{"page":9}}"#.to_string());
        let store = store_for(&backend, "reports/sales");
        assert_eq!(store.load().expect("load"), StoredState::empty());
    }

    #[test]
    fn store_creates_slot_when_absent() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        store
            .store(Some(&StoredState::new(Some(json!(1)), Some(json!({"page": 1})))))
            .expect("store");
        assert_eq!(
            raw_blob(&backend),
            json!({"_global": 1, "reports/sales": {"page": 1}})
        );
    }

    #[test]
    fn store_writes_null_for_missing_partitions() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        store
            .store(Some(&StoredState::new(None, Some(json!("x")))))
            .expect("store");
        assert_eq!(
            raw_blob(&backend),
            json!({"_global": null, "reports/sales": "x"})
        );
        assert_eq!(
            store.load().expect("load"),
            StoredState::new(None, Some(json!("x")))
        );
    }

    #[test]
    fn store_none_removes_slot() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        store
            .store(Some(&StoredState::new(Some(json!(1)), None)))
            .expect("store");
        store.store(None).expect("clear");
        assert!(backend.items.borrow().get("app").is_none());
        assert_eq!(store.load().expect("load"), StoredState::empty());
    }

    #[test]
    fn malformed_slot_is_a_decode_error() {
        let backend = MemoryStore::default();
        backend
            .items
            .borrow_mut()
            .insert("app".to_string(), "{not json".to_string());
        let store = store_for(&backend, "reports/sales");
        assert!(matches!(store.load(), Err(StorageError::Decode { .. })));
        assert!(matches!(
            store.store(Some(&StoredState::empty())),
            Err(StorageError::Decode { .. })
        ));
    }

    #[test]
    fn non_object_slot_is_rejected() {
        let backend = MemoryStore::default();
        backend
            .items
            .borrow_mut()
            .insert("app".to_string(), "[1,2]".to_string());
        let store = store_for(&backend, "reports/sales");
        assert!(matches!(store.load(), Err(StorageError::NotAnObject { .. })));
    }

    #[test]
    fn literal_null_slot_loads_as_empty() {
        let backend = MemoryStore::default();
        backend
            .items
            .borrow_mut()
            .insert("app".to_string(), "null".to_string());
        let store = store_for(&backend, "reports/sales");
        assert_eq!(store.load().expect("load"), StoredState::empty());
    }

    #[test]
    fn backend_write_failure_surfaces_as_backend_error() {
        let backend = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let store = store_for(&backend, "reports/sales");
        let error = store
            .store(Some(&StoredState::empty()))
            .expect_err("write should fail");
        assert!(matches!(error, StorageError::Backend(message) if message == "quota exceeded"));
    }

    #[test]
    fn project_change_ignores_other_areas_and_keys() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        let blob = r#"{"_global":1}"#;

        let other_area = StorageChange {
            same_area: false,
            key: Some("app"),
            new_value: Some(blob),
        };
        let other_key = StorageChange {
            same_area: true,
            key: Some("settings"),
            new_value: Some(blob),
        };
        let cleared = StorageChange {
            same_area: true,
            key: None,
            new_value: None,
        };
        assert_eq!(store.project_change(&other_area).expect("projection"), None);
        assert_eq!(store.project_change(&other_key).expect("projection"), None);
        assert_eq!(store.project_change(&cleared).expect("projection"), None);
    }

    #[test]
    fn project_change_uses_notification_value_not_local_copy() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        store
            .store(Some(&StoredState::new(Some(json!("mine")), None)))
            .expect("store");

        let change = StorageChange {
            same_area: true,
            key: Some("app"),
            new_value: Some(r#"{"_global":"theirs","reports/sales":{"page":4}}"#),
        };
        assert_eq!(
            store.project_change(&change).expect("projection"),
            Some(StoredState::new(Some(json!("theirs")), Some(json!({"page": 4}))))
        );
    }

    #[test]
    fn project_change_of_removed_slot_is_empty_state() {
        let backend = MemoryStore::default();
        let store = store_for(&backend, "reports/sales");
        let change = StorageChange {
            same_area: true,
            key: Some("app"),
            new_value: None,
        };
        assert_eq!(
            store.project_change(&change).expect("projection"),
            Some(StoredState::empty())
        );
    }
}
