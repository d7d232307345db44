use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{cascade_keys, ObjectMap, Storage, StorageError, StorageResult};
use crate::models::{Entity, Kind};

/// Flat-file engine: the full object graph in memory, rewritten to one JSON
/// file on every save.
///
/// The file maps `"<Class>.<id>"` to the object, each tagged with
/// `__class__`. Concurrent saves each rewrite the whole file; the last write
/// wins.
pub struct FileStorage {
    path: PathBuf,
    objects: RwLock<ObjectMap>,
}

impl FileStorage {
    /// Loads `path` into memory. A missing or empty file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let objects = read_objects(&path).await?;
        tracing::debug!("Loaded {} objects from {}", objects.len(), path.display());
        Ok(Self { path, objects: RwLock::new(objects) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_objects(path: &Path) -> StorageResult<ObjectMap> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ObjectMap::new()),
        Err(e) => return Err(e.into()),
    };
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ObjectMap::new());
    }
    let raw: ObjectMap = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    // Re-key from the objects themselves so a hand-edited key cannot desync.
    Ok(raw.into_values().map(|obj| (obj.key(), obj)).collect())
}

#[async_trait]
impl Storage for FileStorage {
    async fn all(&self, kind: Option<Kind>) -> StorageResult<ObjectMap> {
        let objects = self.objects.read().await;
        Ok(match kind {
            Some(kind) => objects
                .iter()
                .filter(|(_, obj)| obj.kind() == kind)
                .map(|(k, obj)| (k.clone(), obj.clone()))
                .collect(),
            None => objects.clone(),
        })
    }

    async fn get(&self, kind: Kind, id: &str) -> StorageResult<Option<Entity>> {
        Ok(self.objects.read().await.get(&kind.key(id)).cloned())
    }

    async fn new(&self, obj: Entity) -> StorageResult<()> {
        self.objects.write().await.insert(obj.key(), obj);
        Ok(())
    }

    async fn save(&self) -> StorageResult<()> {
        // The write happens after the lock is released: overlapping saves may
        // land out of order, leaving the older snapshot on disk.
        let json = {
            let objects = self.objects.read().await;
            serde_json::to_vec(&*objects)?
        };
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("Saved objects to {}", self.path.display());
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> StorageResult<bool> {
        let mut objects = self.objects.write().await;
        if !objects.contains_key(&kind.key(id)) {
            return Ok(false);
        }
        for key in cascade_keys(&objects, kind, id) {
            objects.remove(&key);
        }
        if kind == Kind::Amenity {
            for obj in objects.values_mut() {
                if let Entity::Place(place) = obj {
                    place.unlink_amenity(id);
                }
            }
        }
        Ok(true)
    }

    async fn count(&self, kind: Option<Kind>) -> StorageResult<usize> {
        let objects = self.objects.read().await;
        Ok(match kind {
            Some(kind) => objects.values().filter(|obj| obj.kind() == kind).count(),
            None => objects.len(),
        })
    }

    async fn reload(&self) -> StorageResult<()> {
        let fresh = read_objects(&self.path).await?;
        *self.objects.write().await = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amenity, City, Place, State, User};
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("file.json")).await.unwrap();
        assert_eq!(storage.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        std::fs::write(&path, "{not json").unwrap();
        match FileStorage::open(&path).await {
            Err(StorageError::Corrupt { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected corrupt file error"),
        }
    }

    #[tokio::test]
    async fn saved_file_is_keyed_by_class_and_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        let storage = FileStorage::open(&path).await.unwrap();
        let state = State::new("Oregon");
        storage.new(state.clone().into()).await.unwrap();
        storage.save().await.unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let obj = &raw[format!("State.{}", state.id)];
        assert_eq!(obj["__class__"], "State");
        assert_eq!(obj["name"], "Oregon");
    }

    #[tokio::test]
    async fn deleting_amenity_unlinks_it_from_places() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("file.json")).await.unwrap();
        let state = State::new("CA");
        let city = City::new(&state.id, "LA");
        let user = User::new("x@y.z", "pw");
        let wifi = Amenity::new("Wifi");
        let mut place = Place::new(&city.id, &user.id, "Bungalow");
        place.link_amenity(&wifi.id);
        let objs: [Entity; 5] = [state.into(), city.into(), user.into(), wifi.clone().into(), place.clone().into()];
        for e in objs {
            storage.new(e).await.unwrap();
        }

        assert!(storage.delete(Kind::Amenity, &wifi.id).await.unwrap());
        let place: Place = crate::storage::fetch(&storage, &place.id).await.unwrap().unwrap();
        assert!(place.amenity_ids.is_empty());
    }
}
