//! Movie records and apply-time validation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::CatalogError;

/// A materialized catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub genre: Vec<String>,
    /// 0.0 to 10.0
    pub rating: f32,
    /// Minutes
    pub duration: u32,
    pub release_date: NaiveDate,
    pub language: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated creation payload, captured verbatim at enqueue time.
///
/// Everything is optional here on purpose: the enqueue edge only checks
/// shape, and field presence is enforced at apply time by
/// [`NewMovie::into_record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMovie {
    pub name: Option<String>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub rating: Option<f32>,
    /// Minutes
    pub duration: Option<u32>,
    pub release_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub created_by: Option<String>,
}

impl NewMovie {
    /// Domain checks deferred from the enqueue edge: required fields present,
    /// rating within range. Returns the materialized record on success.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> Result<Movie, CatalogError> {
        let name = required_text(self.name, "name")?;
        let description = required_text(self.description, "description")?;
        if self.genre.is_empty() {
            return Err(CatalogError::Validation("genre is required".into()));
        }
        let duration = self
            .duration
            .ok_or_else(|| CatalogError::Validation("duration is required".into()))?;
        let release_date = self
            .release_date
            .ok_or_else(|| CatalogError::Validation("releaseDate is required".into()))?;
        let language = required_text(self.language, "language")?;
        let created_by = required_text(self.created_by, "createdBy")?;

        let rating = self.rating.unwrap_or(0.0);
        if !(0.0..=10.0).contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "rating {rating} out of range 0..=10"
            )));
        }

        Ok(Movie {
            id,
            name,
            description,
            genre: self.genre,
            rating,
            duration,
            release_date,
            language,
            cast: self.cast,
            director: self.director,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, CatalogError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CatalogError::Validation(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> NewMovie {
        serde_json::from_value(json!({
            "name": "X",
            "description": "A film called X",
            "genre": ["Drama"],
            "duration": 100,
            "releaseDate": "2020-01-01",
            "language": "EN",
            "createdBy": "admin-1"
        }))
        .unwrap()
    }

    #[test]
    fn full_payload_materializes() {
        let movie = full_payload()
            .into_record(Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(movie.name, "X");
        assert_eq!(movie.duration, 100);
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(movie.rating, 0.0);
        assert_eq!(movie.created_by, "admin-1");
        assert!(movie.cast.is_empty());
        assert!(movie.director.is_none());
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut payload = full_payload();
        payload.name = None;
        let err = payload.into_record(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m) if m.contains("name")));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut payload = full_payload();
        payload.name = Some("   ".to_string());
        assert!(payload.into_record(Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn empty_genre_is_rejected() {
        let mut payload = full_payload();
        payload.genre.clear();
        let err = payload.into_record(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m) if m.contains("genre")));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut payload = full_payload();
        payload.rating = Some(11.0);
        assert!(payload.into_record(Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn name_is_trimmed() {
        let mut payload = full_payload();
        payload.name = Some("  X  ".to_string());
        let movie = payload.into_record(Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(movie.name, "X");
    }

    #[test]
    fn unknown_payload_fields_are_ignored() {
        let payload: NewMovie = serde_json::from_value(json!({
            "name": "X",
            "boxOffice": 1_000_000
        }))
        .unwrap();
        assert_eq!(payload.name.as_deref(), Some("X"));
    }
}
