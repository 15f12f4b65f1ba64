//! Catalog store boundary
//!
//! The queue core depends on `insert` only; `get` and `list` back the
//! read-side API.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::movie::{Movie, NewMovie};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("movie not found")]
    NotFound,
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Target store for materialized movie records.
///
/// `insert` is all-or-nothing: a failed insert leaves no partial record
/// behind.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Validate and insert a new movie, returning its id.
    async fn insert(&self, new: NewMovie) -> Result<Uuid, CatalogError>;

    async fn get(&self, id: Uuid) -> Result<Movie, CatalogError>;

    async fn list(&self) -> Result<Vec<Movie>, CatalogError>;
}

/// In-memory catalog (for testing).
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    movies: RwLock<Vec<Movie>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert(&self, new: NewMovie) -> Result<Uuid, CatalogError> {
        let movie = new.into_record(Uuid::new_v4(), Utc::now())?;
        let id = movie.id;
        self.movies.write().await.push(movie);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Movie, CatalogError> {
        self.movies
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Movie>, CatalogError> {
        Ok(self.movies.read().await.clone())
    }
}
