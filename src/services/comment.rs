//! Comment service
//!
//! Creating, editing and deleting comments on news items. Only the author
//! of a comment may change it; for anyone else the comment does not exist.

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{Comment, CommentForm, CommentWithAuthor, FormErrors, User};
use crate::services::validation::require;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Words a comment may not contain, in any letter case
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Error shown when a comment contains a banned word
pub const BAD_WORDS_WARNING: &str = "Не ругайтесь!";

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment (or its news item) does not exist, or belongs to someone else
    #[error("Comment not found")]
    NotFound,

    /// Invalid comment text
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    news_repo: Arc<dyn NewsRepository>,
    comment_repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            news_repo,
            comment_repo,
        }
    }

    /// Comments of a news item, oldest first
    pub async fn list_for_news(
        &self,
        news_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        let comments = self
            .comment_repo
            .list_by_news(news_id)
            .await
            .context("Failed to list comments")?;
        Ok(comments)
    }

    /// Add a comment by `author` to a news item
    pub async fn create(
        &self,
        news_id: i64,
        author: &User,
        form: &CommentForm,
    ) -> Result<Comment, CommentServiceError> {
        self.news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news")?
            .ok_or(CommentServiceError::NotFound)?;

        let text = validate_comment(form).map_err(CommentServiceError::Validation)?;

        let comment = self
            .comment_repo
            .create(news_id, author.id, &text, Utc::now())
            .await
            .context("Failed to create comment")?;

        tracing::info!(
            "User {} commented on news {} (comment {})",
            author.id,
            news_id,
            comment.id
        );
        Ok(comment)
    }

    /// Get a comment written by `author`
    pub async fn get_owned(&self, id: i64, author: &User) -> Result<Comment, CommentServiceError> {
        self.comment_repo
            .get_by_id_and_author(id, author.id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)
    }

    /// Replace the text of a comment written by `author`
    pub async fn update(
        &self,
        id: i64,
        author: &User,
        form: &CommentForm,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.get_owned(id, author).await?;
        let text = validate_comment(form).map_err(CommentServiceError::Validation)?;

        let updated = self
            .comment_repo
            .update_text(comment.id, author.id, &text)
            .await
            .context("Failed to update comment")?;
        if !updated {
            return Err(CommentServiceError::NotFound);
        }

        tracing::info!("User {} edited comment {}", author.id, comment.id);
        Ok(Comment { text, ..comment })
    }

    /// Delete a comment written by `author`, returning the removed comment
    pub async fn delete(&self, id: i64, author: &User) -> Result<Comment, CommentServiceError> {
        let comment = self.get_owned(id, author).await?;

        let deleted = self
            .comment_repo
            .delete(comment.id, author.id)
            .await
            .context("Failed to delete comment")?;
        if !deleted {
            return Err(CommentServiceError::NotFound);
        }

        tracing::info!("User {} deleted comment {}", author.id, comment.id);
        Ok(comment)
    }
}

/// Validate a submitted comment, returning the text to store
pub fn validate_comment(form: &CommentForm) -> Result<String, FormErrors> {
    let text = form.text.trim();
    let mut errors = FormErrors::new();

    if require(&mut errors, "text", text) && contains_bad_word(text) {
        errors.add("text", BAD_WORDS_WARNING);
    }

    errors.into_result().map(|()| text.to_string())
}

/// Case-insensitive search for any banned word
pub fn contains_bad_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().any(|word| lowered.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_news, insert_user, migrated_pool};
    use crate::db::repositories::{SqlxCommentRepository, SqlxNewsRepository};
    use chrono::NaiveDate;

    struct Fixture {
        service: CommentService,
        news_id: i64,
        author: User,
        reader: User,
    }

    fn user(id: i64, username: &str) -> User {
        let mut user = User::new(username.to_string(), "hash".to_string());
        user.id = id;
        user
    }

    async fn setup() -> Fixture {
        let pool = migrated_pool().await;
        let news_id = insert_news(&pool, "Заголовок", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).await;
        let author_id = insert_user(&pool, "Автор").await;
        let reader_id = insert_user(&pool, "Читатель").await;

        Fixture {
            service: CommentService::new(
                SqlxNewsRepository::boxed(pool.clone()),
                SqlxCommentRepository::boxed(pool),
            ),
            news_id,
            author: user(author_id, "Автор"),
            reader: user(reader_id, "Читатель"),
        }
    }

    #[test]
    fn test_bad_words_are_case_insensitive() {
        assert!(contains_bad_word("Какой-то текст, РЕДИСКА, еще текст"));
        assert!(contains_bad_word("негодяйский"));
        assert!(!contains_bad_word("Обычный текст"));
    }

    #[test]
    fn test_validate_comment() {
        assert_eq!(validate_comment(&CommentForm::new("  Текст  ")).unwrap(), "Текст");

        let errors = validate_comment(&CommentForm::new("")).unwrap_err();
        assert_eq!(errors.field("text"), [crate::services::validation::REQUIRED_MESSAGE]);

        let errors = validate_comment(&CommentForm::new("Ты редиска")).unwrap_err();
        assert_eq!(errors.field("text"), [BAD_WORDS_WARNING]);
    }

    #[tokio::test]
    async fn test_create_comment() {
        let f = setup().await;

        let comment = f
            .service
            .create(f.news_id, &f.author, &CommentForm::new("Текст комментария"))
            .await
            .unwrap();

        assert_eq!(comment.author_id, f.author.id);
        assert_eq!(comment.news_id, f.news_id);
        let thread = f.service.list_for_news(f.news_id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].author_username, "Автор");
    }

    #[tokio::test]
    async fn test_create_comment_with_bad_word_is_rejected() {
        let f = setup().await;

        let text = format!("Какой-то текст, {}, еще текст", BAD_WORDS[0]);
        let result = f.service.create(f.news_id, &f.author, &CommentForm::new(text)).await;

        assert!(matches!(result, Err(CommentServiceError::Validation(_))));
        assert!(f.service.list_for_news(f.news_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_comment_on_missing_news() {
        let f = setup().await;
        let result = f
            .service
            .create(f.news_id + 100, &f.author, &CommentForm::new("Текст"))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_only_author_can_change_comment() {
        let f = setup().await;
        let comment = f
            .service
            .create(f.news_id, &f.author, &CommentForm::new("Текст"))
            .await
            .unwrap();

        let edit = f
            .service
            .update(comment.id, &f.reader, &CommentForm::new("Чужой текст"))
            .await;
        assert!(matches!(edit, Err(CommentServiceError::NotFound)));
        let delete = f.service.delete(comment.id, &f.reader).await;
        assert!(matches!(delete, Err(CommentServiceError::NotFound)));

        let thread = f.service.list_for_news(f.news_id).await.unwrap();
        assert_eq!(thread[0].text, "Текст");

        let updated = f
            .service
            .update(comment.id, &f.author, &CommentForm::new("Обновлённый комментарий"))
            .await
            .unwrap();
        assert_eq!(updated.text, "Обновлённый комментарий");

        f.service.delete(comment.id, &f.author).await.unwrap();
        assert!(f.service.list_for_news(f.news_id).await.unwrap().is_empty());
    }
}
