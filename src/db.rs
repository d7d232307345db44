use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};
use std::str::FromStr;

use crate::models::Kind;

/// Table backing each entity class.
pub fn table(kind: Kind) -> &'static str {
    match kind {
        Kind::Amenity => "amenities",
        Kind::City => "cities",
        Kind::Place => "places",
        Kind::Review => "reviews",
        Kind::State => "states",
        Kind::User => "users",
    }
}

/// Opens (and creates if needed) the SQLite database at `url`.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !url.contains(":memory:") && !Sqlite::database_exists(url).await.unwrap_or(false) {
        tracing::info!("Creating SQLite database at {}", url);
        Sqlite::create_database(url).await?;
    }
    let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(8)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA temp_store=MEMORY;").execute(&mut *conn).await;
                Ok(())
            })
        })
        .connect_with(options)
        .await
}

pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Cascades depend on this
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    let tables = [
        r#"CREATE TABLE IF NOT EXISTS states (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            name TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS cities (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            state_id TEXT NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(state_id) REFERENCES states(id) ON DELETE CASCADE
        )"#,
        r#"CREATE TABLE IF NOT EXISTS amenities (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            name TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT ''
        )"#,
        r#"CREATE TABLE IF NOT EXISTS places (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            city_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            number_rooms INTEGER NOT NULL DEFAULT 0,
            number_bathrooms INTEGER NOT NULL DEFAULT 0,
            max_guest INTEGER NOT NULL DEFAULT 0,
            price_by_night INTEGER NOT NULL DEFAULT 0,
            latitude REAL NOT NULL DEFAULT 0,
            longitude REAL NOT NULL DEFAULT 0,
            FOREIGN KEY(city_id) REFERENCES cities(id) ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#,
        r#"CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            place_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            text TEXT NOT NULL,
            FOREIGN KEY(place_id) REFERENCES places(id) ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#,
        r#"CREATE TABLE IF NOT EXISTS place_amenity (
            place_id TEXT NOT NULL,
            amenity_id TEXT NOT NULL,
            PRIMARY KEY(place_id, amenity_id),
            FOREIGN KEY(place_id) REFERENCES places(id) ON DELETE CASCADE,
            FOREIGN KEY(amenity_id) REFERENCES amenities(id) ON DELETE CASCADE
        )"#,
    ];
    for ddl in tables {
        sqlx::query(ddl).execute(pool).await?;
    }

    let indexes = [
        ("idx_cities_state", "CREATE INDEX IF NOT EXISTS idx_cities_state ON cities(state_id)"),
        ("idx_places_city", "CREATE INDEX IF NOT EXISTS idx_places_city ON places(city_id)"),
        ("idx_places_user", "CREATE INDEX IF NOT EXISTS idx_places_user ON places(user_id)"),
        ("idx_reviews_place", "CREATE INDEX IF NOT EXISTS idx_reviews_place ON reviews(place_id)"),
        ("idx_reviews_user", "CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id)"),
        ("idx_place_amenity_amenity", "CREATE INDEX IF NOT EXISTS idx_place_amenity_amenity ON place_amenity(amenity_id)"),
    ];
    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
