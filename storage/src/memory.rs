use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use common::error::{AppError, Res};
use futures::future::{self, BoxFuture};

use crate::ObjectStorage;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Process-local storage for development and tests.
///
/// Keys whose file name contains one of the configured fragments fail on
/// `put` and `delete`, so callers can exercise their storage-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    failing: HashSet<String>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        MemoryStorage {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, fragment: impl Into<String>) -> Self {
        self.failing.insert(fragment.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn should_fail(&self, key: &str) -> bool {
        self.failing.iter().any(|fragment| key.contains(fragment.as_str()))
    }

    fn with_objects<T>(&self, f: impl FnOnce(&mut HashMap<String, StoredObject>) -> T) -> Res<T> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| AppError::Internal("memory storage lock poisoned".to_string()))?;
        Ok(f(&mut objects))
    }
}

impl ObjectStorage for MemoryStorage {
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>, content_type: &'a str) -> BoxFuture<'a, Res<String>> {
        let result = if self.should_fail(key) {
            Err(AppError::Storage(format!("failed to store {}", key)))
        } else {
            self.with_objects(|objects| {
                objects.insert(
                    key.to_string(),
                    StoredObject {
                        bytes,
                        content_type: content_type.to_string(),
                    },
                );
                key.to_string()
            })
        };
        Box::pin(future::ready(result))
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Res<()>> {
        let result = if self.should_fail(key) {
            Err(AppError::Storage(format!("failed to delete {}", key)))
        } else {
            self.with_objects(|objects| {
                objects.remove(key);
            })
        };
        Box::pin(future::ready(result))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
