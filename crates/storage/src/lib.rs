#![forbid(unsafe_code)]

pub mod content;
pub mod repository;
pub mod sqlite;

pub use content::{ContentError, ContentRepository, StaticContent};
pub use repository::{CompletionRow, InMemoryRepository, ProgressStore, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
