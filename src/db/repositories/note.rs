//! Note repository
//!
//! Every read and write is scoped to the note's author.

use crate::db::DynDatabasePool;
use crate::models::{Note, NoteInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Store a new note for `author_id`
    async fn create(&self, author_id: i64, input: &NoteInput) -> Result<Note>;

    /// Get an author's note by slug
    async fn get_by_slug_and_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>>;

    /// All notes of an author, in creation order
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>>;

    /// Whether any note (of any author) uses `slug`, ignoring `exclude_id`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Overwrite an author's note. Returns false when nothing matched.
    async fn update(&self, id: i64, author_id: i64, input: &NoteInput) -> Result<bool>;

    /// Delete an author's note. Returns false when nothing matched.
    async fn delete(&self, id: i64, author_id: i64) -> Result<bool>;
}

/// SQLx-based note repository implementation
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    /// Create a new SQLx note repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, author_id: i64, input: &NoteInput) -> Result<Note> {
        create_note(self.pool.sqlite(), author_id, input).await
    }

    async fn get_by_slug_and_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, text, slug, author_id
            FROM notes
            WHERE slug = ? AND author_id = ?
            "#,
        )
        .bind(slug)
        .bind(author_id)
        .fetch_optional(self.pool.sqlite())
        .await
        .context("Failed to get note by slug")?;

        Ok(row.as_ref().map(row_to_note))
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, text, slug, author_id
            FROM notes
            WHERE author_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list notes")?;

        Ok(rows.iter().map(row_to_note).collect())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        slug_exists(self.pool.sqlite(), slug, exclude_id).await
    }

    async fn update(&self, id: i64, author_id: i64, input: &NoteInput) -> Result<bool> {
        update_note(self.pool.sqlite(), id, author_id, input).await
    }

    async fn delete(&self, id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete note")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Whether a failed write was rejected by the unique index on `notes.slug`
pub fn is_slug_conflict(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .map_or(false, |db_error| db_error.is_unique_violation())
}

async fn create_note(pool: &SqlitePool, author_id: i64, input: &NoteInput) -> Result<Note> {
    let result = sqlx::query(
        r#"
        INSERT INTO notes (title, text, slug, author_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(&input.slug)
    .bind(author_id)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        text: input.text.clone(),
        slug: input.slug.clone(),
        author_id,
    })
}

async fn slug_exists(pool: &SqlitePool, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notes
        WHERE slug = ? AND (? IS NULL OR id <> ?)
        "#,
    )
    .bind(slug)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(pool)
    .await
    .context("Failed to check note slug")?;

    Ok(count > 0)
}

async fn update_note(pool: &SqlitePool, id: i64, author_id: i64, input: &NoteInput) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE notes
        SET title = ?, text = ?, slug = ?
        WHERE id = ? AND author_id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(&input.slug)
    .bind(id)
    .bind(author_id)
    .execute(pool)
    .await
    .context("Failed to update note")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_note(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}
