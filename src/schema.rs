use chrono::NaiveDate;

/// Page size used when `limit` is missing or unusable
pub const DEFAULT_LIMIT: i64 = 10;

// Struct representing the request body for signing up
#[derive(serde::Deserialize)]
pub struct SignupSchema {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

// Struct representing the request body for signing in
#[derive(serde::Deserialize)]
pub struct SigninSchema {
    pub username: String,
    pub password: String,
}

// Struct representing the request body for creating a new to-do item
#[derive(Debug, serde::Deserialize)]
pub struct CreateItemSchema {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

// Query string of the item listing
#[derive(Debug, Default, serde::Deserialize)]
pub struct ListItemsQuery {
    pub limit: Option<String>,
}

impl ListItemsQuery {
    /// Requested page size, falling back to the default when absent, non-numeric or not positive
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT)
    }
}
