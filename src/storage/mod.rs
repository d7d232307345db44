//! Storage engines.
//!
//! [`Storage`] is the persistence contract shared by the whole API. Two
//! engines implement it:
//!
//! - [`FileStorage`]: the object graph lives in memory and is written as one
//!   JSON document on every `save`.
//! - [`DbStorage`]: a SQLite database accessed through sqlx, with one
//!   process-wide session that `save` commits.
//!
//! Handlers never know which engine is active.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageConfig, StorageKind};
use crate::models::{Entity, Kind, Model};

pub mod database;
pub mod file;

pub use database::DbStorage;
pub use file::FileStorage;

/// Errors raised by the storage engines.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("storage file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize objects: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage file {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Objects keyed by `"<Class>.<id>"`.
pub type ObjectMap = BTreeMap<String, Entity>;

/// The persistence contract.
///
/// `new` stages an insert-or-replace and `delete` stages a removal; both are
/// visible to subsequent reads right away and become durable on `save`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All objects, or all objects of one class.
    async fn all(&self, kind: Option<Kind>) -> StorageResult<ObjectMap>;

    async fn get(&self, kind: Kind, id: &str) -> StorageResult<Option<Entity>>;

    /// Registers an object. An existing object with the same id is replaced.
    async fn new(&self, obj: Entity) -> StorageResult<()>;

    /// Persists everything staged since the last save.
    async fn save(&self) -> StorageResult<()>;

    /// Removes an object and its dependents. Returns `false` if it did not exist.
    async fn delete(&self, kind: Kind, id: &str) -> StorageResult<bool>;

    async fn count(&self, kind: Option<Kind>) -> StorageResult<usize>;

    /// Drops unsaved changes and reloads the persisted state.
    async fn reload(&self) -> StorageResult<()>;
}

/// Typed [`Storage::get`].
pub async fn fetch<M: Model>(storage: &dyn Storage, id: &str) -> StorageResult<Option<M>> {
    Ok(storage.get(M::KIND, id).await?.and_then(|e| M::try_from(e).ok()))
}

/// Typed [`Storage::all`], ordered by key.
pub async fn fetch_all<M: Model>(storage: &dyn Storage) -> StorageResult<Vec<M>> {
    Ok(storage.all(Some(M::KIND)).await?.into_values().filter_map(|e| M::try_from(e).ok()).collect())
}

/// Stages `obj` and saves immediately.
pub async fn persist<M: Model>(storage: &dyn Storage, obj: M) -> StorageResult<()> {
    storage.new(obj.into()).await?;
    storage.save().await
}

/// Opens the engine selected by the configuration.
pub async fn open(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match cfg.kind {
        StorageKind::File => {
            crate::config::ensure_file_parent_dir(&cfg.file_path)?;
            let storage = FileStorage::open(&cfg.file_path).await?;
            tracing::info!("Using file storage at {}", cfg.file_path);
            Ok(Arc::new(storage))
        }
        StorageKind::Db => {
            crate::config::ensure_sqlite_parent_dir(&cfg.database_url)?;
            let storage = DbStorage::connect(&cfg.database_url).await?;
            tracing::info!("Using database storage at {}", cfg.database_url);
            Ok(Arc::new(storage))
        }
    }
}

/// Keys of the objects that must disappear together with `kind`/`id`,
/// the object itself included.
///
/// Mirrors the `ON DELETE CASCADE` rules of the SQL schema so both engines
/// delete the same rows.
pub(crate) fn cascade_keys(objects: &ObjectMap, kind: Kind, id: &str) -> Vec<String> {
    let mut doomed = vec![kind.key(id)];
    let mut queue = vec![(kind, id.to_string())];

    while let Some((parent_kind, parent_id)) = queue.pop() {
        for obj in objects.values() {
            let is_child = match (parent_kind, obj) {
                (Kind::State, Entity::City(c)) => c.state_id == parent_id,
                (Kind::City, Entity::Place(p)) => p.city_id == parent_id,
                (Kind::User, Entity::Place(p)) => p.user_id == parent_id,
                (Kind::User, Entity::Review(r)) => r.user_id == parent_id,
                (Kind::Place, Entity::Review(r)) => r.place_id == parent_id,
                _ => false,
            };
            if is_child {
                let key = obj.key();
                if !doomed.contains(&key) {
                    doomed.push(key);
                    queue.push((obj.kind(), obj.id().to_string()));
                }
            }
        }
    }
    doomed
}
