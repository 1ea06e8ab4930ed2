//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. The game only needs a flat
//! key-value collaborator: one JSON record stored under a fixed key.

use anyhow::Result;
use async_trait::async_trait;

/// Key-value persistence collaborator
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Retrieve the value stored under `key`
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any existing value for the same key
    async fn put_value(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value.
    /// Returns true if the key existed
    async fn delete_value(&self, key: &str) -> Result<bool>;
}
