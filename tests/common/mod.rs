//! Shared setup for the HTTP tests: an in-memory database, the real
//! router behind `axum_test::TestServer`, and helpers to seed data.

#![allow(dead_code)]

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{DateTime, NaiveDate, Utc};

use ya_sites::api::{self, AppState};
use ya_sites::config::Config;
use ya_sites::db::{self, DynDatabasePool};
use ya_sites::models::{Comment, CreateNewsInput, News, Note, NoteForm, User};
use ya_sites::services::RegisterInput;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub pool: DynDatabasePool,
}

/// A logged-in user and the cookie that identifies them
pub struct Client {
    pub user: User,
    pub cookie: HeaderValue,
}

impl Client {
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        (header::COOKIE, self.cookie.clone())
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config::default()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let pool = db::create_test_pool().await.expect("Failed to create test pool");
    db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool.clone(), config).expect("Failed to build state");
    let server = TestServer::new(api::build_router(state.clone())).expect("Failed to start server");

    TestApp {
        server,
        state,
        pool,
    }
}

impl TestApp {
    /// Register a user and open a session for them
    pub async fn login(&self, username: &str) -> Client {
        let user = self
            .state
            .user_service
            .register(RegisterInput::new(username, "Пароль-123"))
            .await
            .expect("Failed to register user");
        let session = self
            .state
            .user_service
            .start_session(user.id)
            .await
            .expect("Failed to start session");

        Client {
            user,
            cookie: HeaderValue::from_str(&format!("session={}", session.id)).unwrap(),
        }
    }

    pub async fn create_news(&self, title: &str, date: NaiveDate) -> News {
        self.state
            .news_service
            .create(CreateNewsInput::new(title, "Просто текст.").with_date(date))
            .await
            .expect("Failed to create news")
    }

    pub async fn create_comment(&self, news: &News, author: &User, text: &str) -> Comment {
        self.state
            .comment_service
            .create(news.id, author, &ya_sites::models::CommentForm::new(text))
            .await
            .expect("Failed to create comment")
    }

    pub async fn create_note(&self, author: &User, title: &str, slug: &str) -> Note {
        self.state
            .note_service
            .create(author, &NoteForm::new(title, "Текст заметки").with_slug(slug))
            .await
            .expect("Failed to create note")
    }

    /// Rewrite a comment's creation time
    pub async fn set_comment_created(&self, comment_id: i64, created: DateTime<Utc>) {
        sqlx::query("UPDATE comments SET created = ? WHERE id = ?")
            .bind(created)
            .bind(comment_id)
            .execute(self.pool.sqlite())
            .await
            .expect("Failed to update comment");
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.pool.sqlite())
            .await
            .expect("Failed to count rows")
    }

    pub async fn comment_text(&self, comment_id: i64) -> Option<String> {
        sqlx::query_scalar("SELECT text FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(self.pool.sqlite())
            .await
            .expect("Failed to read comment")
    }

    pub async fn note_row(&self, note_id: i64) -> Option<(String, String, String, i64)> {
        sqlx::query_as("SELECT title, text, slug, author_id FROM notes WHERE id = ?")
            .bind(note_id)
            .fetch_optional(self.pool.sqlite())
            .await
            .expect("Failed to read note")
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Values of every `attr="..."` in document order
pub fn attribute_values(html: &str, attr: &str) -> Vec<String> {
    let marker = format!("{}=\"", attr);
    html.split(&marker)
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}
