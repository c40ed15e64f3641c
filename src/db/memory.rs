// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process backend for local development and tests.
//!
//! Documents are kept as JSON values so records round-trip through serde
//! exactly as they would through Firestore.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<u64, Value>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential IDs starting at 1, shared by all collections.
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: u64,
    ) -> Result<Option<T>, AppError> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(&id).cloned())
            .map(decode)
            .transpose()
    }

    pub fn put<T: Serialize>(&self, collection: &str, id: u64, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Database(format!("Failed to encode document: {}", e)))?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, value);
        Ok(())
    }

    pub fn delete(&self, collection: &str, id: u64) {
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(&id);
        }
    }

    /// All documents in ID order.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, AppError> {
        let docs: Vec<Value> = self
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        docs.into_iter().map(decode).collect()
    }

    pub fn find_by_field<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError> {
        let docs: Vec<Value> = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| doc.get(field).and_then(Value::as_str) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        docs.into_iter().map(decode).collect()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Failed to decode document: {}", e)))
}
