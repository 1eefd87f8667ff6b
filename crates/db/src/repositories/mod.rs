use async_trait::async_trait;
use thiserror::Error;

pub mod lunch;
pub mod memory;

pub use lunch::SqlLunchRepository;
pub use memory::InMemoryLunchRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("author `{0}` already has a restaurant registered")]
    DuplicateAuthor(String),
}

/// Single-value-per-author lunch preference storage.
#[async_trait]
pub trait LunchRepository: Send + Sync {
    /// Registers a restaurant for the author. One entry per author;
    /// registering a second one is an error, not an overwrite.
    async fn add_restaurant(
        &self,
        author_id: &str,
        restaurant: &str,
    ) -> Result<(), RepositoryError>;

    /// Drops every registration of the given restaurant, returning how many
    /// entries were removed.
    async fn remove_restaurant(&self, restaurant: &str) -> Result<u64, RepositoryError>;

    /// All registered restaurants, in registration order.
    async fn list_restaurants(&self) -> Result<Vec<String>, RepositoryError>;
}
