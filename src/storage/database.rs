use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Acquire, FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::Mutex;

use super::{ObjectMap, Storage, StorageResult};
use crate::db;
use crate::models::{Amenity, City, Entity, Kind, Place, Review, State, User};

/// SQLite engine.
///
/// Writes go into one process-wide session: the first `new`/`delete` opens a
/// transaction, reads run inside it while it is open (so staged changes are
/// visible), `save` commits and `reload` rolls back. Deletes cascade through
/// the schema's foreign keys.
pub struct DbStorage {
    pool: SqlitePool,
    session: Mutex<Option<Transaction<'static, Sqlite>>>,
}

impl DbStorage {
    /// Connects to `url` and makes sure the schema exists.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let pool = db::connect(url).await?;
        db::init_db(&pool).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps a pool whose schema is already initialized.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool, session: Mutex::new(None) }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for DbStorage {
    async fn all(&self, kind: Option<Kind>) -> StorageResult<ObjectMap> {
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => Kind::ALL.to_vec(),
        };
        let mut session = self.session.lock().await;
        let mut pooled;
        let conn: &mut SqliteConnection = match session.as_mut() {
            Some(tx) => &mut **tx,
            None => {
                pooled = self.pool.acquire().await?;
                &mut *pooled
            }
        };

        let mut out = ObjectMap::new();
        for kind in kinds {
            for obj in select_all(conn, kind).await? {
                out.insert(obj.key(), obj);
            }
        }
        Ok(out)
    }

    async fn get(&self, kind: Kind, id: &str) -> StorageResult<Option<Entity>> {
        let mut session = self.session.lock().await;
        let mut pooled;
        let conn: &mut SqliteConnection = match session.as_mut() {
            Some(tx) => &mut **tx,
            None => {
                pooled = self.pool.acquire().await?;
                &mut *pooled
            }
        };
        Ok(select_one(conn, kind, id).await?)
    }

    async fn new(&self, obj: Entity) -> StorageResult<()> {
        let mut session = self.session.lock().await;
        let tx = match session.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        let tx = session.insert(tx);

        // A failed write must not leave partial rows in the session
        let mut savepoint = Acquire::begin(&mut *tx).await?;
        match upsert(&mut savepoint, &obj).await {
            Ok(()) => {
                savepoint.commit().await?;
                Ok(())
            }
            Err(e) => {
                savepoint.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn save(&self) -> StorageResult<()> {
        if let Some(tx) = self.session.lock().await.take() {
            tx.commit().await?;
            tracing::debug!("Committed storage session");
        }
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> StorageResult<bool> {
        let mut session = self.session.lock().await;
        let tx = match session.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        let tx = session.insert(tx);

        let mut savepoint = Acquire::begin(&mut *tx).await?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", db::table(kind));
        match sqlx::query(&sql).bind(id).execute(&mut *savepoint).await {
            Ok(res) => {
                savepoint.commit().await?;
                Ok(res.rows_affected() > 0)
            }
            Err(e) => {
                savepoint.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn count(&self, kind: Option<Kind>) -> StorageResult<usize> {
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => Kind::ALL.to_vec(),
        };
        let mut session = self.session.lock().await;
        let mut pooled;
        let conn: &mut SqliteConnection = match session.as_mut() {
            Some(tx) => &mut **tx,
            None => {
                pooled = self.pool.acquire().await?;
                &mut *pooled
            }
        };

        let mut total = 0usize;
        for kind in kinds {
            let sql = format!("SELECT COUNT(*) FROM {}", db::table(kind));
            let n: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
            total += n.max(0) as usize;
        }
        Ok(total)
    }

    async fn reload(&self) -> StorageResult<()> {
        if let Some(tx) = self.session.lock().await.take() {
            tx.rollback().await?;
            tracing::debug!("Rolled back storage session");
        }
        Ok(())
    }
}

const STATE_COLUMNS: &str = "id, created_at, updated_at, name";
const CITY_COLUMNS: &str = "id, created_at, updated_at, state_id, name";
const AMENITY_COLUMNS: &str = "id, created_at, updated_at, name";
const USER_COLUMNS: &str = "id, created_at, updated_at, email, password, first_name, last_name";
const PLACE_COLUMNS: &str = "id, created_at, updated_at, city_id, user_id, name, description, \
     number_rooms, number_bathrooms, max_guest, price_by_night, latitude, longitude";
const REVIEW_COLUMNS: &str = "id, created_at, updated_at, place_id, user_id, text";

fn columns(kind: Kind) -> &'static str {
    match kind {
        Kind::Amenity => AMENITY_COLUMNS,
        Kind::City => CITY_COLUMNS,
        Kind::Place => PLACE_COLUMNS,
        Kind::Review => REVIEW_COLUMNS,
        Kind::State => STATE_COLUMNS,
        Kind::User => USER_COLUMNS,
    }
}

async fn rows<M>(conn: &mut SqliteConnection, sql: &str, id: Option<&str>) -> sqlx::Result<Vec<M>>
where
    M: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut query = sqlx::query_as::<_, M>(sql);
    if let Some(id) = id {
        query = query.bind(id.to_string());
    }
    query.fetch_all(&mut *conn).await
}

async fn select(conn: &mut SqliteConnection, kind: Kind, id: Option<&str>) -> sqlx::Result<Vec<Entity>> {
    let sql = match id {
        Some(_) => format!("SELECT {} FROM {} WHERE id = ?1", columns(kind), db::table(kind)),
        None => format!("SELECT {} FROM {} ORDER BY id", columns(kind), db::table(kind)),
    };
    Ok(match kind {
        Kind::Amenity => rows::<Amenity>(conn, &sql, id).await?.into_iter().map(Entity::from).collect(),
        Kind::City => rows::<City>(conn, &sql, id).await?.into_iter().map(Entity::from).collect(),
        Kind::Review => rows::<Review>(conn, &sql, id).await?.into_iter().map(Entity::from).collect(),
        Kind::State => rows::<State>(conn, &sql, id).await?.into_iter().map(Entity::from).collect(),
        Kind::User => rows::<User>(conn, &sql, id).await?.into_iter().map(Entity::from).collect(),
        Kind::Place => {
            let mut places = rows::<Place>(conn, &sql, id).await?;
            let mut links = amenity_links(conn, id).await?;
            for place in &mut places {
                place.amenity_ids = links.remove(&place.id).unwrap_or_default();
            }
            places.into_iter().map(Entity::from).collect()
        }
    })
}

async fn select_all(conn: &mut SqliteConnection, kind: Kind) -> sqlx::Result<Vec<Entity>> {
    select(conn, kind, None).await
}

async fn select_one(conn: &mut SqliteConnection, kind: Kind, id: &str) -> sqlx::Result<Option<Entity>> {
    Ok(select(conn, kind, Some(id)).await?.into_iter().next())
}

/// Amenity ids per place, in link order. Restricted to one place when given.
async fn amenity_links(
    conn: &mut SqliteConnection,
    place_id: Option<&str>,
) -> sqlx::Result<HashMap<String, Vec<String>>> {
    let pairs: Vec<(String, String)> = match place_id {
        Some(place_id) => {
            sqlx::query_as("SELECT place_id, amenity_id FROM place_amenity WHERE place_id = ?1 ORDER BY rowid")
                .bind(place_id.to_string())
                .fetch_all(&mut *conn)
                .await?
        }
        None => {
            sqlx::query_as("SELECT place_id, amenity_id FROM place_amenity ORDER BY rowid")
                .fetch_all(&mut *conn)
                .await?
        }
    };
    let mut links: HashMap<String, Vec<String>> = HashMap::new();
    for (place_id, amenity_id) in pairs {
        links.entry(place_id).or_default().push(amenity_id);
    }
    Ok(links)
}

/// Insert-or-update without `REPLACE`, which would fire the delete cascades.
async fn upsert(conn: &mut SqliteConnection, obj: &Entity) -> sqlx::Result<()> {
    match obj {
        Entity::State(o) => {
            sqlx::query(
                "INSERT INTO states (id, created_at, updated_at, name) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at, name = excluded.name",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.name)
            .execute(&mut *conn)
            .await?;
        }
        Entity::Amenity(o) => {
            sqlx::query(
                "INSERT INTO amenities (id, created_at, updated_at, name) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at, name = excluded.name",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.name)
            .execute(&mut *conn)
            .await?;
        }
        Entity::City(o) => {
            sqlx::query(
                "INSERT INTO cities (id, created_at, updated_at, state_id, name) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at,
                     state_id = excluded.state_id, name = excluded.name",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.state_id)
            .bind(&o.name)
            .execute(&mut *conn)
            .await?;
        }
        Entity::User(o) => {
            sqlx::query(
                "INSERT INTO users (id, created_at, updated_at, email, password, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at, email = excluded.email,
                     password = excluded.password, first_name = excluded.first_name,
                     last_name = excluded.last_name",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.email)
            .bind(&o.password)
            .bind(&o.first_name)
            .bind(&o.last_name)
            .execute(&mut *conn)
            .await?;
        }
        Entity::Review(o) => {
            sqlx::query(
                "INSERT INTO reviews (id, created_at, updated_at, place_id, user_id, text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at,
                     place_id = excluded.place_id, user_id = excluded.user_id, text = excluded.text",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.place_id)
            .bind(&o.user_id)
            .bind(&o.text)
            .execute(&mut *conn)
            .await?;
        }
        Entity::Place(o) => {
            sqlx::query(
                "INSERT INTO places (id, created_at, updated_at, city_id, user_id, name, description,
                     number_rooms, number_bathrooms, max_guest, price_by_night, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at,
                     city_id = excluded.city_id, user_id = excluded.user_id, name = excluded.name,
                     description = excluded.description, number_rooms = excluded.number_rooms,
                     number_bathrooms = excluded.number_bathrooms, max_guest = excluded.max_guest,
                     price_by_night = excluded.price_by_night, latitude = excluded.latitude,
                     longitude = excluded.longitude",
            )
            .bind(&o.id)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(&o.city_id)
            .bind(&o.user_id)
            .bind(&o.name)
            .bind(&o.description)
            .bind(o.number_rooms)
            .bind(o.number_bathrooms)
            .bind(o.max_guest)
            .bind(o.price_by_night)
            .bind(o.latitude)
            .bind(o.longitude)
            .execute(&mut *conn)
            .await?;

            sqlx::query("DELETE FROM place_amenity WHERE place_id = ?1")
                .bind(&o.id)
                .execute(&mut *conn)
                .await?;
            for amenity_id in &o.amenity_ids {
                sqlx::query("INSERT OR IGNORE INTO place_amenity (place_id, amenity_id) VALUES (?1, ?2)")
                    .bind(&o.id)
                    .bind(amenity_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }
    }
    Ok(())
}
