// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Db`] fronts either Firestore or the in-process store and exposes
//! typed operations over [`Document`] records.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{Contact, Offering, Task, Testimonial, User};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const OFFERINGS: &str = "servicos";
    pub const CONTACTS: &str = "contatos";
    pub const TESTIMONIALS: &str = "testimonials";
    pub const TASKS: &str = "tasks";
}

/// A record stored in its own collection, keyed by numeric ID.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> u64;
}

macro_rules! impl_document {
    ($($ty:ty => $collection:expr),* $(,)?) => {
        $(
            impl Document for $ty {
                const COLLECTION: &'static str = $collection;

                fn id(&self) -> u64 {
                    self.id
                }
            }
        )*
    };
}

impl_document! {
    User => collections::USERS,
    Offering => collections::OFFERINGS,
    Contact => collections::CONTACTS,
    Testimonial => collections::TESTIMONIALS,
    Task => collections::TASKS,
}

/// Random IDs are kept within 53 bits so browsers can hold them as numbers.
const FIRESTORE_ID_MASK: u64 = (1 << 53) - 1;
const ID_ALLOCATION_ATTEMPTS: usize = 3;

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(Arc<MemoryStore>),
}

/// Database handle shared by all handlers.
#[derive(Clone)]
pub struct Db {
    backend: Backend,
}

impl Db {
    /// Open the backend selected by configuration.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Firestore => Self::connect_firestore(&config.gcp_project_id).await,
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn connect_firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Self {
            backend: Backend::Firestore(FirestoreStore::connect(project_id).await?),
        })
    }

    /// Fresh, empty in-process database.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::new())),
        }
    }

    // ─── Generic Operations ──────────────────────────────────────

    pub async fn get<T: Document>(&self, id: u64) -> Result<Option<T>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get(T::COLLECTION, id).await,
            Backend::Memory(store) => store.get(T::COLLECTION, id),
        }
    }

    /// Create or replace a record under its own ID.
    pub async fn put<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.put(T::COLLECTION, doc.id(), doc).await,
            Backend::Memory(store) => store.put(T::COLLECTION, doc.id(), doc),
        }
    }

    /// Allocate a fresh ID, build the record with it and store it.
    pub async fn insert<T, F>(&self, build: F) -> Result<T, AppError>
    where
        T: Document,
        F: FnOnce(u64) -> T,
    {
        let id = self.allocate_id::<T>().await?;
        let doc = build(id);
        self.put(&doc).await?;
        tracing::debug!(collection = T::COLLECTION, id, "Document created");
        Ok(doc)
    }

    /// Delete a record, returning whether it existed.
    pub async fn delete<T: Document>(&self, id: u64) -> Result<bool, AppError> {
        if self.get::<T>(id).await?.is_none() {
            return Ok(false);
        }

        match &self.backend {
            Backend::Firestore(store) => store.delete(T::COLLECTION, id).await?,
            Backend::Memory(store) => store.delete(T::COLLECTION, id),
        }
        tracing::debug!(collection = T::COLLECTION, id, "Document deleted");
        Ok(true)
    }

    /// Every record in the collection, unordered.
    pub async fn list<T: Document>(&self) -> Result<Vec<T>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.list(T::COLLECTION).await,
            Backend::Memory(store) => store.list(T::COLLECTION),
        }
    }

    async fn find_by_field<T: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<T>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.find_by_field(T::COLLECTION, field, value).await,
            Backend::Memory(store) => store.find_by_field(T::COLLECTION, field, value),
        }
    }

    async fn allocate_id<T: Document>(&self) -> Result<u64, AppError> {
        match &self.backend {
            Backend::Memory(store) => Ok(store.allocate_id()),
            Backend::Firestore(_) => {
                use ring::rand::SecureRandom;

                let rng = ring::rand::SystemRandom::new();
                for _ in 0..ID_ALLOCATION_ATTEMPTS {
                    let mut bytes = [0u8; 8];
                    rng.fill(&mut bytes)
                        .map_err(|_| AppError::Internal(anyhow::anyhow!("RNG failure")))?;
                    let id = u64::from_be_bytes(bytes) & FIRESTORE_ID_MASK;
                    if id != 0 && self.get::<T>(id).await?.is_none() {
                        return Ok(id);
                    }
                }
                Err(AppError::Database(format!(
                    "Could not allocate a free ID in {}",
                    T::COLLECTION
                )))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by ID. Used after token verification to confirm the
    /// account still exists.
    pub async fn find_user_by_id(&self, id: u64) -> Result<Option<User>, AppError> {
        self.get::<User>(id).await
    }

    /// Look up a user by login email (case-sensitive, as stored).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut users = self.find_by_field::<User>("email", email).await?;
        if users.len() > 1 {
            tracing::warn!(count = users.len(), "Multiple accounts share one email");
        }
        Ok(users.pop())
    }
}
