//! # Storage Module
//!
//! Handles persistence of the player profile.
//!
//! The domain layer only talks to [`ProfileRepository`], which serializes the
//! profile to JSON and hands it to a [`KeyValueStorage`] implementation. The
//! shipped implementation is a SQLite key-value table; any other backend only
//! needs to provide get/put/delete by key.

pub mod profile_repository;
pub mod sqlite;
pub mod traits;

pub use profile_repository::{ProfileRepository, PROFILE_KEY};
pub use sqlite::SqliteStore;
pub use traits::KeyValueStorage;
