//! In-process [`Store`] used by tests in place of Postgres.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Entity, Store, StoreError};

/// How an entity is built and patched without a database.
pub trait MemoryEntity: Entity {
    fn materialize(id: i64, new: Self::New, now: OffsetDateTime) -> Self;
    fn apply(&mut self, patch: Self::Patch, now: OffsetDateTime);
}

type DeleteHook = Box<dyn Fn(i64) + Send + Sync>;

pub struct MemoryStore<E> {
    inner: Mutex<Inner<E>>,
    on_delete: Option<DeleteHook>,
}

struct Inner<E> {
    rows: BTreeMap<i64, E>,
    next_id: i64,
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
            on_delete: None,
        }
    }
}

impl<E> MemoryStore<E> {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    /// Calls `hook` with the id of each removed row, after the lock is released.
    pub fn on_delete(mut self, hook: impl Fn(i64) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Box::new(hook));
        self
    }

    pub fn modify_all(&self, mut f: impl FnMut(&mut E)) {
        self.inner.lock().unwrap().rows.values_mut().for_each(|row| f(row));
    }
}

#[async_trait]
impl<E: MemoryEntity> Store<E> for MemoryStore<E> {
    async fn insert(&self, new: E::New) -> Result<E, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let key = E::new_key(&new);
        if inner.rows.values().any(|row| row.unique_key() == key) {
            return Err(StoreError::UniqueViolation);
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let row = E::materialize(id, new, OffsetDateTime::now_utc());
        inner.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.inner.lock().unwrap().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, StoreError> {
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.values().find(|row| row.unique_key() == key).cloned())
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(key) = E::patch_key(&patch) {
            let taken = inner
                .rows
                .values()
                .any(|row| row.id() != id && row.unique_key() == key);
            if taken {
                return Err(StoreError::UniqueViolation);
            }
        }
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.apply(patch, OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self.inner.lock().unwrap().rows.remove(&id).is_some();
        if removed {
            if let Some(hook) = &self.on_delete {
                hook(id);
            }
        }
        Ok(removed)
    }
}
