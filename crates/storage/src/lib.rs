#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{DEFAULT_NAMESPACE, DraftRepository, InMemoryRepository, Storage, StorageError};
