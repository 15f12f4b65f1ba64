//! Apply routine for deferred movie inserts

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use marquee_catalog::{CatalogError, CatalogStore, NewMovie};
use marquee_queue::{ApplyError, JobHandler};

/// Job kind handled by [`InsertMovieHandler`].
pub const INSERT_MOVIE: &str = "insert_movie";

/// Turns an `insert_movie` payload into a single catalog insert.
///
/// Validation happens here, at apply time, not at the enqueue edge: a job
/// whose payload fails the domain checks ends `Failed` and no record is
/// created.
pub struct InsertMovieHandler {
    catalog: Arc<dyn CatalogStore>,
}

impl InsertMovieHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl JobHandler for InsertMovieHandler {
    async fn apply(&self, payload: serde_json::Value) -> Result<(), ApplyError> {
        let new: NewMovie = serde_json::from_value(payload)
            .map_err(|e| ApplyError::Validation(format!("malformed payload: {e}")))?;

        let id = self.catalog.insert(new).await.map_err(|e| match e {
            CatalogError::Validation(msg) => ApplyError::Validation(msg),
            other => ApplyError::Storage(other.to_string()),
        })?;

        info!(movie_id = %id, "movie inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_catalog::MemoryCatalog;
    use serde_json::json;

    #[tokio::test]
    async fn valid_payload_creates_one_movie() {
        let catalog = Arc::new(MemoryCatalog::new());
        let handler = InsertMovieHandler::new(catalog.clone());

        handler
            .apply(json!({
                "name": "X",
                "description": "A film called X",
                "genre": ["Drama"],
                "duration": 100,
                "releaseDate": "2020-01-01",
                "language": "EN",
                "createdBy": "admin-1"
            }))
            .await
            .unwrap();

        let movies = catalog.list().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].name, "X");
    }

    #[tokio::test]
    async fn missing_field_is_a_validation_error() {
        let catalog = Arc::new(MemoryCatalog::new());
        let handler = InsertMovieHandler::new(catalog.clone());

        let err = handler
            .apply(json!({
                "description": "no name",
                "genre": ["Drama"],
                "duration": 100,
                "releaseDate": "2020-01-01",
                "language": "EN",
                "createdBy": "admin-1"
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::Validation(ref m) if m.contains("name")));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_payload_is_a_validation_error() {
        let catalog = Arc::new(MemoryCatalog::new());
        let handler = InsertMovieHandler::new(catalog);

        let err = handler.apply(json!("not an object")).await.unwrap_err();
        assert!(matches!(err, ApplyError::Validation(_)));
    }
}
