use async_trait::async_trait;

use super::{LunchRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLunchRepository {
    pool: DbPool,
}

impl SqlLunchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LunchRepository for SqlLunchRepository {
    async fn add_restaurant(
        &self,
        author_id: &str,
        restaurant: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("INSERT INTO lunch_preferences (author_id, restaurant) VALUES (?, ?)")
                .bind(author_id)
                .bind(restaurant)
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RepositoryError::DuplicateAuthor(author_id.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_restaurant(&self, restaurant: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM lunch_preferences WHERE restaurant = ?")
            .bind(restaurant)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_restaurants(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT restaurant FROM lunch_preferences ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(restaurant,)| restaurant).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::migrations::run_pending;
    use crate::repositories::{LunchRepository, RepositoryError, SqlLunchRepository};
    use crate::{connect_with_settings, DbPool};

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        pool
    }

    #[tokio::test]
    async fn registered_restaurants_are_listed_in_order() {
        let repo = SqlLunchRepository::new(migrated_pool().await);

        repo.add_restaurant("ann", "Luigi's").await.expect("add Luigi's");
        repo.add_restaurant("ben", "Burger Barn").await.expect("add Burger Barn");

        let restaurants = repo.list_restaurants().await.expect("list");
        assert_eq!(restaurants, vec!["Luigi's".to_owned(), "Burger Barn".to_owned()]);
    }

    #[tokio::test]
    async fn second_registration_per_author_is_rejected() {
        let repo = SqlLunchRepository::new(migrated_pool().await);

        repo.add_restaurant("ann", "Luigi's").await.expect("first add");
        let result = repo.add_restaurant("ann", "Burger Barn").await;

        assert!(matches!(
            result,
            Err(RepositoryError::DuplicateAuthor(author)) if author == "ann"
        ));
    }

    #[tokio::test]
    async fn remove_reports_how_many_entries_were_dropped() {
        let repo = SqlLunchRepository::new(migrated_pool().await);

        repo.add_restaurant("ann", "Luigi's").await.expect("add ann");
        repo.add_restaurant("ben", "Luigi's").await.expect("add ben");
        repo.add_restaurant("cleo", "Burger Barn").await.expect("add cleo");

        let removed = repo.remove_restaurant("Luigi's").await.expect("remove");
        assert_eq!(removed, 2);

        let restaurants = repo.list_restaurants().await.expect("list");
        assert_eq!(restaurants, vec!["Burger Barn".to_owned()]);
    }

    #[tokio::test]
    async fn removing_an_unknown_restaurant_is_a_no_op() {
        let repo = SqlLunchRepository::new(migrated_pool().await);

        let removed = repo.remove_restaurant("Nowhere").await.expect("remove");
        assert_eq!(removed, 0);
    }
}
