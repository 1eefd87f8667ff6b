use tokio::sync::RwLock;

use super::{LunchRepository, RepositoryError};

/// Registration-ordered in-memory stand-in for the SQL repository.
#[derive(Default)]
pub struct InMemoryLunchRepository {
    entries: RwLock<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl LunchRepository for InMemoryLunchRepository {
    async fn add_restaurant(
        &self,
        author_id: &str,
        restaurant: &str,
    ) -> Result<(), RepositoryError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|(author, _)| author == author_id) {
            return Err(RepositoryError::DuplicateAuthor(author_id.to_owned()));
        }
        entries.push((author_id.to_owned(), restaurant.to_owned()));
        Ok(())
    }

    async fn remove_restaurant(&self, restaurant: &str) -> Result<u64, RepositoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(_, entry)| entry != restaurant);
        Ok((before - entries.len()) as u64)
    }

    async fn list_restaurants(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(_, restaurant)| restaurant.clone()).collect())
    }
}
