//! Running and cycling workout tracker.
//!
//! [`store::WorkoutStore`] owns the workout collection, validates raw form
//! input and persists through a [`storage::BlobStore`]. [`app::App`] wires a
//! store to a list view and a map.

pub mod app;
pub mod cli;
pub mod database;
pub mod error;
pub mod record;
pub mod storage;
pub mod store;
pub mod types;
pub mod utils;
pub mod view;

pub use app::App;
pub use database::SqliteBlobStore;
pub use error::{Error, Field, Result};
pub use storage::{BlobStore, JsonDirStore, MemoryBlobStore, StorageError};
pub use store::{RawWorkoutInput, WorkoutStore, restore_all};
pub use types::{Coords, Metrics, Workout, WorkoutId, WorkoutKind};
