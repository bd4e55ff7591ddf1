//! To-do item store
//!
//! Every read is filtered by the owning user in the query itself.

use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::model::{NewTodoItem, TodoItem};

#[derive(Clone)]
pub struct ItemStore {
    pool: SqlitePool,
}

impl ItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, item: &NewTodoItem) -> Result<TodoItem, StoreError> {
        let item = sqlx::query_as::<_, TodoItem>(
            "INSERT INTO todoitems (name, date, description, user_id) VALUES (?, ?, ?, ?) RETURNING id, name, date, description, user_id",
        )
        .bind(&item.name)
        .bind(item.date)
        .bind(&item.description)
        .bind(item.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// Items of `owner_id`, earliest date first, at most `limit` of them
    pub async fn list(&self, limit: i64, owner_id: i64) -> Result<Vec<TodoItem>, StoreError> {
        let items = sqlx::query_as::<_, TodoItem>(
            "SELECT id, name, date, description, user_id FROM todoitems WHERE user_id = ? ORDER BY date ASC, id ASC LIMIT ?",
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_one(&self, id: i64, owner_id: i64) -> Result<TodoItem, StoreError> {
        sqlx::query_as::<_, TodoItem>(
            "SELECT id, name, date, description, user_id FROM todoitems WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Item with ID: {id}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::NewUser;
    use crate::password::fast_params;
    use crate::store::{test_pool, UserStore};

    async fn setup() -> (ItemStore, i64, i64) {
        let pool = test_pool().await;
        let users = UserStore::new(pool.clone(), fast_params());

        let mut ids = vec![];
        for username in ["alice", "bob"] {
            let user = NewUser {
                username: username.to_owned(),
                name: username.to_owned(),
                email: format!("{username}@example.com"),
            };
            ids.push(users.create(&user, "pw").await.unwrap().user_id);
        }

        (ItemStore::new(pool), ids[0], ids[1])
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn new_item(name: &str, day: u32, user_id: i64) -> NewTodoItem {
        NewTodoItem {
            name: name.to_owned(),
            date: date(day),
            description: format!("{name} description"),
            user_id,
        }
    }

    #[tokio::test]
    async fn create_assigns_id() {
        let (store, alice, _) = setup().await;

        let item = store.create(&new_item("groceries", 5, alice)).await.unwrap();
        assert_eq!(item.name, "groceries");
        assert_eq!(item.date, date(5));
        assert_eq!(item.description, "groceries description");
        assert_eq!(item.user_id, alice);

        let other = store.create(&new_item("laundry", 6, alice)).await.unwrap();
        assert_ne!(item.id, other.id);
    }

    #[tokio::test]
    async fn create_with_unknown_owner_fails() {
        let (store, _, _) = setup().await;

        let err = store.create(&new_item("orphan", 1, 999)).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)), "{err:?}");
    }

    #[tokio::test]
    async fn list_ordered_and_truncated() {
        let (store, alice, _) = setup().await;

        // Inserted out of order on purpose
        let third = store.create(&new_item("third", 20, alice)).await.unwrap();
        let first = store.create(&new_item("first", 1, alice)).await.unwrap();
        let second = store.create(&new_item("second", 10, alice)).await.unwrap();

        let items = store.list(2, alice).await.unwrap();
        assert_eq!(items, vec![first.clone(), second.clone()]);

        let items = store.list(10, alice).await.unwrap();
        assert_eq!(items, vec![first, second, third]);
    }

    #[tokio::test]
    async fn list_scoped_to_owner() {
        let (store, alice, bob) = setup().await;

        for day in 1..=3 {
            store.create(&new_item("alice's", day, alice)).await.unwrap();
            store.create(&new_item("bob's", day, bob)).await.unwrap();
        }

        let items = store.list(100, alice).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.user_id == alice));

        let items = store.list(100, bob).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.user_id == bob));

        assert!(store.list(100, 999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_one_checks_owner() {
        let (store, alice, bob) = setup().await;
        let item = store.create(&new_item("private", 1, alice)).await.unwrap();

        assert_eq!(store.get_one(item.id, alice).await.unwrap(), item);
        assert!(matches!(
            store.get_one(item.id, bob).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.get_one(item.id + 100, alice).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
