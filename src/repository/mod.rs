//! Generic CRUD repository shared by users, products and categories.
//!
//! Each entity names its unique column and supplies a [`Store`] backend.
//! The repository layers the uniqueness pre-check, existence checks and
//! error classification on top of the raw store.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod memory;

/// A persisted record with a surrogate id and one unique text column.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Insert payload.
    type New: Send + Sync;
    /// Partial update payload; absent fields keep their stored value.
    type Patch: Send + Sync;

    const NAME: &'static str;
    const PLURAL: &'static str;
    const UNIQUE_FIELD: &'static str;

    fn id(&self) -> i64;
    fn unique_key(&self) -> &str;
    fn new_key(new: &Self::New) -> &str;
    fn patch_key(patch: &Self::Patch) -> Option<&str>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => Self::UniqueViolation,
            Some(db) if db.is_foreign_key_violation() => Self::ForeignKeyViolation,
            _ => Self::Database(err),
        }
    }
}

/// Raw persistence for one entity type.
#[async_trait]
pub trait Store<E: Entity>: Send + Sync {
    async fn insert(&self, new: E::New) -> Result<E, StoreError>;
    async fn find_all(&self) -> Result<Vec<E>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, StoreError>;
    async fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError>;
    /// Returns `None` when no row has `id`.
    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A referenced row vanished before the write landed.
    #[error("{0} references a missing row")]
    MissingReference(&'static str),
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl RepoError {
    fn conflict<E: Entity>() -> Self {
        Self::Conflict {
            entity: E::NAME,
            field: E::UNIQUE_FIELD,
        }
    }

    fn from_store<E: Entity>(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => Self::conflict::<E>(),
            StoreError::ForeignKeyViolation => Self::MissingReference(E::NAME),
            other => Self::Storage(other),
        }
    }
}

pub struct Repository<E: Entity> {
    store: Arc<dyn Store<E>>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn Store<E>>) -> Self {
        Self { store }
    }

    /// Inserts `new` unless a row already holds its unique key.
    ///
    /// The lookup only produces the friendlier early error; a constraint
    /// violation raised by the insert itself is reported as a conflict too.
    pub async fn create(&self, new: E::New) -> Result<E, RepoError> {
        if self.find_by_key(E::new_key(&new)).await?.is_some() {
            warn!(entity = E::NAME, field = E::UNIQUE_FIELD, "duplicate on create");
            return Err(RepoError::conflict::<E>());
        }
        let row = self
            .store
            .insert(new)
            .await
            .map_err(RepoError::from_store::<E>)?;
        debug!(entity = E::NAME, id = row.id(), "row inserted");
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<E>, RepoError> {
        self.store.find_all().await.map_err(RepoError::Storage)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<E, RepoError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(RepoError::Storage)?
            .ok_or(RepoError::NotFound(E::NAME))
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<E>, RepoError> {
        self.store.find_by_key(key).await.map_err(RepoError::Storage)
    }

    pub async fn update(&self, id: i64, patch: E::Patch) -> Result<E, RepoError> {
        let current = self.get_by_id(id).await?;
        if let Some(key) = E::patch_key(&patch) {
            if key != current.unique_key() {
                if let Some(other) = self.find_by_key(key).await? {
                    if other.id() != id {
                        warn!(entity = E::NAME, id, "duplicate on update");
                        return Err(RepoError::conflict::<E>());
                    }
                }
            }
        }
        self.store
            .update(id, patch)
            .await
            .map_err(RepoError::from_store::<E>)?
            .ok_or(RepoError::NotFound(E::NAME))
    }

    /// Checks existence first so a missing row is reported before any removal.
    pub async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.get_by_id(id).await?;
        let removed = self.store.delete(id).await.map_err(RepoError::Storage)?;
        if !removed {
            return Err(RepoError::NotFound(E::NAME));
        }
        debug!(entity = E::NAME, id, "row deleted");
        Ok(())
    }
}
