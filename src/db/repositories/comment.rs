//! Comment repository
//!
//! Comments belong to a news item and an author. Edits and deletions are
//! scoped by author: a row owned by someone else is simply not found.

use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Store a new comment
    async fn create(
        &self,
        news_id: i64,
        author_id: i64,
        text: &str,
        created: DateTime<Utc>,
    ) -> Result<Comment>;

    /// Get comment by ID, only if written by `author_id`
    async fn get_by_id_and_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>>;

    /// Comments of a news item, oldest first
    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Replace the text of an author's comment. Returns false when nothing matched.
    async fn update_text(&self, id: i64, author_id: i64, text: &str) -> Result<bool>;

    /// Delete an author's comment. Returns false when nothing matched.
    async fn delete(&self, id: i64, author_id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(
        &self,
        news_id: i64,
        author_id: i64,
        text: &str,
        created: DateTime<Utc>,
    ) -> Result<Comment> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (news_id, author_id, text, created)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(news_id)
        .bind(author_id)
        .bind(text)
        .bind(created)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            news_id,
            author_id,
            text: text.to_string(),
            created,
        })
    }

    async fn get_by_id_and_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, news_id, author_id, text, created
            FROM comments
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(id)
        .bind(author_id)
        .fetch_optional(self.pool.sqlite())
        .await
        .context("Failed to get comment")?;

        Ok(row.as_ref().map(row_to_comment))
    }

    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        list_comments_by_news(self.pool.sqlite(), news_id).await
    }

    async fn update_text(&self, id: i64, author_id: i64, text: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ? AND author_id = ?")
            .bind(text)
            .bind(id)
            .bind(author_id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to update comment")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

async fn list_comments_by_news(pool: &SqlitePool, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_id, u.username AS author_username, c.text, c.created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.news_id = ?
        ORDER BY c.created ASC, c.id ASC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            id: row.get("id"),
            news_id: row.get("news_id"),
            author_id: row.get("author_id"),
            author_username: row.get("author_username"),
            text: row.get("text"),
            created: row.get("created"),
        })
        .collect())
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_news, insert_user, migrated_pool};
    use chrono::{Duration, NaiveDate, TimeZone};
    use proptest::prelude::*;

    async fn setup() -> (SqlxCommentRepository, i64, i64, i64) {
        let pool = migrated_pool().await;
        let news_id = insert_news(&pool, "Заголовок", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).await;
        let author = insert_user(&pool, "Автор").await;
        let reader = insert_user(&pool, "Читатель").await;
        (SqlxCommentRepository::new(pool), news_id, author, reader)
    }

    #[tokio::test]
    async fn test_create_and_get_comment() {
        let (repo, news_id, author, reader) = setup().await;

        let comment = repo
            .create(news_id, author, "Текст комментария", Utc::now())
            .await
            .expect("Failed to create comment");

        let found = repo
            .get_by_id_and_author(comment.id, author)
            .await
            .unwrap()
            .expect("comment");
        assert_eq!(found, comment);
        assert!(repo.get_by_id_and_author(comment.id, reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_news_is_oldest_first() {
        let (repo, news_id, author, _) = setup().await;
        let now = Utc::now();

        // Inserted newest first so insertion order differs from creation order
        for index in (0..5).rev() {
            repo.create(news_id, author, &format!("Текст {index}"), now + Duration::days(index))
                .await
                .unwrap();
        }

        let comments = repo.list_by_news(news_id).await.unwrap();
        assert_eq!(comments.len(), 5);
        assert!(comments.windows(2).all(|pair| pair[0].created <= pair[1].created));
        assert_eq!(comments[0].text, "Текст 0");
        assert_eq!(comments[0].author_username, "Автор");
    }

    #[tokio::test]
    async fn test_update_and_delete_are_scoped_to_author() {
        let (repo, news_id, author, reader) = setup().await;
        let comment = repo.create(news_id, author, "Текст", Utc::now()).await.unwrap();

        assert!(!repo.update_text(comment.id, reader, "Чужой текст").await.unwrap());
        assert!(!repo.delete(comment.id, reader).await.unwrap());
        let kept = repo.get_by_id_and_author(comment.id, author).await.unwrap().unwrap();
        assert_eq!(kept.text, "Текст");

        assert!(repo.update_text(comment.id, author, "Новый текст").await.unwrap());
        let updated = repo.get_by_id_and_author(comment.id, author).await.unwrap().unwrap();
        assert_eq!(updated.text, "Новый текст");

        assert!(repo.delete(comment.id, author).await.unwrap());
        assert!(repo.get_by_id_and_author(comment.id, author).await.unwrap().is_none());
        assert!(repo.list_by_news(news_id).await.unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Stored timestamps carry 0, 3, 6 or 9 fraction digits; the thread
        /// must still come back in chronological order.
        #[test]
        fn prop_list_by_news_orders_by_created(
            offsets in prop::collection::vec(
                prop_oneof![
                    (0i64..5).prop_map(|seconds| seconds * 1_000_000_000),
                    (0i64..5_000).prop_map(|millis| millis * 1_000_000),
                    0i64..5_000_000_000,
                ],
                1..12,
            ),
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let (repo, news_id, author, _) = setup().await;
                let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

                let mut expected = Vec::new();
                for offset in &offsets {
                    let created = base + Duration::nanoseconds(*offset);
                    let comment = repo.create(news_id, author, "Текст", created).await.unwrap();
                    expected.push((created, comment.id));
                }
                expected.sort();

                let listed: Vec<(DateTime<Utc>, i64)> = repo
                    .list_by_news(news_id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|comment| (comment.created, comment.id))
                    .collect();
                assert_eq!(listed, expected);
            });
        }
    }
}
