//! News service
//!
//! Read side of the news feed: the home page listing and single items.

use crate::db::repositories::NewsRepository;
use crate::models::{CreateNewsInput, FormErrors, News, NEWS_TITLE_MAX_LENGTH};
use crate::services::validation::{limit_length, require};
use anyhow::Context;
use std::sync::Arc;

/// Default number of news items on the home page
pub const DEFAULT_COUNT_ON_HOME_PAGE: u32 = 10;

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// News item does not exist
    #[error("News not found")]
    NotFound,

    /// Invalid input
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News service
pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
    count_on_home_page: u32,
}

impl NewsService {
    /// Create a news service showing `count_on_home_page` items on the home page
    pub fn with_page_size(repo: Arc<dyn NewsRepository>, count_on_home_page: u32) -> Self {
        Self {
            repo,
            count_on_home_page,
        }
    }

    /// The most recent news, newest first
    pub async fn home(&self) -> Result<Vec<News>, NewsServiceError> {
        let news = self
            .repo
            .list_latest(self.count_on_home_page)
            .await
            .context("Failed to list latest news")?;
        Ok(news)
    }

    /// Get a news item by ID
    pub async fn get(&self, id: i64) -> Result<News, NewsServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound)
    }

    /// Publish a news item
    pub async fn create(&self, input: CreateNewsInput) -> Result<News, NewsServiceError> {
        let input = CreateNewsInput {
            title: input.title.trim().to_string(),
            text: input.text.trim().to_string(),
            date: input.date,
        };

        let mut errors = FormErrors::new();
        if require(&mut errors, "title", &input.title) {
            limit_length(&mut errors, "title", &input.title, NEWS_TITLE_MAX_LENGTH);
        }
        require(&mut errors, "text", &input.text);
        errors.into_result().map_err(NewsServiceError::Validation)?;

        let news = self
            .repo
            .create(&input)
            .await
            .context("Failed to create news")?;

        tracing::info!("Published news {} ({})", news.id, news.date);
        Ok(news)
    }
}
