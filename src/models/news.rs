//! News model

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum news title length
pub const NEWS_TITLE_MAX_LENGTH: usize = 50;

/// A published news item. News is not owned by any user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

/// Input for publishing a news item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub text: String,
    /// Publication date, today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CreateNewsInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// The publication date to store
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}
