//! Apply routines registered with the queue worker

pub mod insert_movie;

pub use insert_movie::{InsertMovieHandler, INSERT_MOVIE};
