//! Movie catalog backed by SQLite
//!
//! Single-row inserts keep the apply all-or-nothing at this boundary.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use marquee_catalog::movie::{Movie, NewMovie};
use marquee_catalog::store::{CatalogError, CatalogStore};

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> CatalogError {
    CatalogError::Unavailable(e.to_string())
}

fn movie_from_row(row: &SqliteRow) -> Result<Movie, CatalogError> {
    let id_str: String = row.try_get("id").map_err(unavailable)?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|_| CatalogError::Unavailable("invalid movie id in store".into()))?;

    let genre_json: String = row.try_get("genre").map_err(unavailable)?;
    let genre: Vec<String> = serde_json::from_str(&genre_json)
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
    let cast_json: String = row.try_get("cast_members").map_err(unavailable)?;
    let cast: Vec<String> = serde_json::from_str(&cast_json)
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

    let rating: f64 = row.try_get("rating").map_err(unavailable)?;
    let duration: i64 = row.try_get("duration").map_err(unavailable)?;
    let release_date: NaiveDate = row.try_get("release_date").map_err(unavailable)?;
    let created_at: NaiveDateTime = row.try_get("created_at").map_err(unavailable)?;
    let updated_at: NaiveDateTime = row.try_get("updated_at").map_err(unavailable)?;

    Ok(Movie {
        id,
        name: row.try_get("name").map_err(unavailable)?,
        description: row.try_get("description").map_err(unavailable)?,
        genre,
        rating: rating as f32,
        duration: duration as u32,
        release_date,
        language: row.try_get("language").map_err(unavailable)?,
        cast,
        director: row.try_get::<Option<String>, _>("director").ok().flatten(),
        created_by: row.try_get("created_by").map_err(unavailable)?,
        created_at: created_at.and_utc(),
        updated_at: updated_at.and_utc(),
    })
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn insert(&self, new: NewMovie) -> Result<Uuid, CatalogError> {
        let movie = new.into_record(Uuid::new_v4(), Utc::now())?;

        let genre = serde_json::to_string(&movie.genre)
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        let cast = serde_json::to_string(&movie.cast)
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        sqlx::query(
            "INSERT INTO movies \
             (id, name, description, genre, rating, duration, release_date, language, \
              cast_members, director, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(movie.id.to_string())
        .bind(&movie.name)
        .bind(&movie.description)
        .bind(genre)
        .bind(movie.rating as f64)
        .bind(movie.duration as i64)
        .bind(movie.release_date)
        .bind(&movie.language)
        .bind(cast)
        .bind(movie.director.as_deref())
        .bind(&movie.created_by)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(movie.id)
    }

    async fn get(&self, id: Uuid) -> Result<Movie, CatalogError> {
        let row = sqlx::query("SELECT * FROM movies WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
            .ok_or(CatalogError::NotFound)?;

        movie_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<Movie>, CatalogError> {
        let rows = sqlx::query("SELECT * FROM movies ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.iter().map(movie_from_row).collect()
    }
}
