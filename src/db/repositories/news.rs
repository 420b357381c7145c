//! News repository
//!
//! News items are read-only for site visitors; they are published
//! through the service layer or directly in the database.

use crate::db::DynDatabasePool;
use crate::models::{CreateNewsInput, News};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Publish a news item
    async fn create(&self, input: &CreateNewsInput) -> Result<News>;

    /// Get news by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Newest news first, at most `limit` items
    async fn list_latest(&self, limit: u32) -> Result<Vec<News>>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<News> {
        create_news(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get news by ID")?;

        Ok(row.as_ref().map(row_to_news))
    }

    async fn list_latest(&self, limit: u32) -> Result<Vec<News>> {
        list_latest_news(self.pool.sqlite(), limit).await
    }
}

async fn create_news(pool: &SqlitePool, input: &CreateNewsInput) -> Result<News> {
    let date = input.date_or_today();
    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(date)
        .execute(pool)
        .await
        .context("Failed to create news")?;

    Ok(News {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        text: input.text.clone(),
        date,
    })
}

async fn list_latest_news(pool: &SqlitePool, limit: u32) -> Result<Vec<News>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, text, date
        FROM news
        ORDER BY date DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await
    .context("Failed to list news")?;

    Ok(rows.iter().map(row_to_news).collect())
}

fn row_to_news(row: &sqlx::sqlite::SqliteRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}
