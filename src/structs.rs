use serde::Serialize;
use sqlx::FromRow;

/// A note row joined with its optional label, so templates can show the
/// label title/color without a second lookup.
#[derive(Serialize, FromRow, Debug, Clone)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub label_id: Option<i64>,
    pub owner: i64,
    pub created: i64,
    pub changed: i64,
    pub label_title: Option<String>,
    pub label_color: Option<String>,
}

#[derive(Serialize, FromRow, Debug, Clone)]
pub struct Label {
    pub id: i64,
    pub title: String,
    pub color: String,
    pub owner: i64,
}

// Never serialized; the password hash stays server-side.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
