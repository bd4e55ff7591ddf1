use chrono::NaiveDate;

// Public projection of a user. The password hash never leaves the users table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
}

// Fields of a user about to be created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
}

// Data model representing a to-do item
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct TodoItem {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

// Fields of a to-do item about to be created
#[derive(Debug, Clone)]
pub struct NewTodoItem {
    pub name: String,
    pub date: NaiveDate,
    pub description: String,
    pub user_id: i64,
}
