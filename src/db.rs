use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::structs::{Label, Note, User};

const NOTE_COLUMNS: &str = "n.id, n.title, n.content, n.pinned, n.label_id, n.owner, \
     n.created, n.changed, l.title AS label_title, l.color AS label_color";

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// Notes ///////////////////////////////////////////////////////////////////////////////////////////

/// All of the owner's notes, optionally restricted to one label.
pub async fn list_notes(
    pool: &SqlitePool,
    owner: i64,
    label_id: Option<i64>,
) -> anyhow::Result<Vec<Note>> {
    let notes = match label_id {
        Some(label_id) => {
            sqlx::query_as::<_, Note>(&format!(
                r#"
                SELECT {NOTE_COLUMNS}
                FROM notes n LEFT JOIN labels l ON l.id = n.label_id
                WHERE n.owner = ?1 AND n.label_id = ?2
                ORDER BY n.changed DESC
                "#
            ))
            .bind(owner)
            .bind(label_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Note>(&format!(
                r#"
                SELECT {NOTE_COLUMNS}
                FROM notes n LEFT JOIN labels l ON l.id = n.label_id
                WHERE n.owner = ?1
                ORDER BY n.changed DESC
                "#
            ))
            .bind(owner)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(notes)
}

/// Owner-scoped lookup; `None` means not found or not the caller's note.
pub async fn get_note(pool: &SqlitePool, owner: i64, id: i64) -> anyhow::Result<Option<Note>> {
    let note = sqlx::query_as::<_, Note>(&format!(
        r#"
        SELECT {NOTE_COLUMNS}
        FROM notes n LEFT JOIN labels l ON l.id = n.label_id
        WHERE n.owner = ?1 AND n.id = ?2
        "#
    ))
    .bind(owner)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(note)
}

pub async fn create_note(
    pool: &SqlitePool,
    owner: i64,
    title: &str,
    content: &str,
    pinned: bool,
    label_id: Option<i64>,
) -> anyhow::Result<i64> {
    let now = Utc::now().timestamp();
    let id = sqlx::query(
        r#"
        INSERT INTO notes ( title, content, pinned, label_id, owner, created, changed )
        VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?6 )
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(pinned)
    .bind(label_id)
    .bind(owner)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Mutates title/content/pinned/label in place; owner and created are never touched.
pub async fn update_note(
    pool: &SqlitePool,
    owner: i64,
    id: i64,
    title: &str,
    content: &str,
    pinned: bool,
    label_id: Option<i64>,
) -> anyhow::Result<bool> {
    let now = Utc::now().timestamp();
    let rows_affected = sqlx::query(
        r#"
        UPDATE notes
        SET title = ?1, content = ?2, pinned = ?3, label_id = ?4, changed = ?5
        WHERE owner = ?6 AND id = ?7
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(pinned)
    .bind(label_id)
    .bind(now)
    .bind(owner)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

pub async fn delete_note(pool: &SqlitePool, owner: i64, id: i64) -> anyhow::Result<bool> {
    let rows_affected = sqlx::query("DELETE FROM notes WHERE owner = ?1 AND id = ?2")
        .bind(owner)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected > 0)
}

// Labels //////////////////////////////////////////////////////////////////////////////////////////

pub async fn list_labels(pool: &SqlitePool, owner: i64) -> anyhow::Result<Vec<Label>> {
    let labels = sqlx::query_as::<_, Label>(
        "SELECT id, title, color, owner FROM labels WHERE owner = ?1 ORDER BY title",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(labels)
}

pub async fn get_label(pool: &SqlitePool, owner: i64, id: i64) -> anyhow::Result<Option<Label>> {
    let label = sqlx::query_as::<_, Label>(
        "SELECT id, title, color, owner FROM labels WHERE owner = ?1 AND id = ?2",
    )
    .bind(owner)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(label)
}

pub async fn create_label(
    pool: &SqlitePool,
    owner: i64,
    title: &str,
    color: &str,
) -> anyhow::Result<i64> {
    let id = sqlx::query("INSERT INTO labels ( title, color, owner ) VALUES ( ?1, ?2, ?3 )")
        .bind(title)
        .bind(color)
        .bind(owner)
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn update_label(
    pool: &SqlitePool,
    owner: i64,
    id: i64,
    title: &str,
    color: &str,
) -> anyhow::Result<bool> {
    let rows_affected =
        sqlx::query("UPDATE labels SET title = ?1, color = ?2 WHERE owner = ?3 AND id = ?4")
            .bind(title)
            .bind(color)
            .bind(owner)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

    Ok(rows_affected > 0)
}

/// Deleting a label unlabels any notes that referenced it. The nullify and
/// the delete happen in one transaction so readers never see a dangling
/// reference.
pub async fn delete_label(pool: &SqlitePool, owner: i64, id: i64) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE notes SET label_id = NULL WHERE owner = ?1 AND label_id = ?2")
        .bind(owner)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let rows_affected = sqlx::query("DELETE FROM labels WHERE owner = ?1 AND id = ?2")
        .bind(owner)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(rows_affected > 0)
}

// Users ///////////////////////////////////////////////////////////////////////////////////////////

pub async fn get_user(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_name(pool: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Returns `None` when the username is already taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> anyhow::Result<Option<i64>> {
    let res = sqlx::query("INSERT INTO users ( username, password_hash ) VALUES ( ?1, ?2 )")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await;

    match res {
        Ok(done) => Ok(Some(done.last_insert_rowid())),
        Err(sqlx::Error::Database(e))
            if matches!(e.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
