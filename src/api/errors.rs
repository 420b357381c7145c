//! HTML error responses
//!
//! Handlers fail with `WebError`. The response carries an `ErrorPage`
//! extension, which the `error_pages` middleware renders with the site
//! templates; without it the plain fallback body is served.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::urls;
use crate::models::FormErrors;
use crate::services::{
    CommentServiceError, NewsServiceError, NoteServiceError, UserServiceError,
};
use crate::theme::simple_error_page;

/// Handler error
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Missing page, or a page the visitor may not see
    #[error("Not found")]
    NotFound,

    /// Anonymous visitor on a protected page; holds the path to return to
    #[error("Login required for {0}")]
    LoginRequired(String),

    /// Form errors that no page could show
    #[error("Bad request: {0}")]
    BadRequest(FormErrors),

    /// Request body that could not be read as the expected form
    #[error("Unreadable request body ({0}): {1}")]
    UnreadableBody(StatusCode, String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error page details left on a response for the `error_pages` middleware
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorPage {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn into_response(self) -> Response {
        let body = simple_error_page(self.status.as_u16(), &self.message);
        let mut response = (self.status, Html(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound => {
                ErrorPage::new(StatusCode::NOT_FOUND, "Страница не найдена").into_response()
            }
            WebError::LoginRequired(next) => urls::found(&urls::login_with_next(&next)),
            WebError::BadRequest(errors) => {
                tracing::debug!("Rejected form: {}", errors);
                ErrorPage::new(StatusCode::BAD_REQUEST, "Некорректный запрос").into_response()
            }
            WebError::UnreadableBody(status, reason) => {
                tracing::debug!("Rejected request body: {}", reason);
                ErrorPage::new(status, "Некорректный запрос").into_response()
            }
            WebError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                ErrorPage::new(StatusCode::INTERNAL_SERVER_ERROR, "Внутренняя ошибка сервера")
                    .into_response()
            }
        }
    }
}

impl From<NewsServiceError> for WebError {
    fn from(err: NewsServiceError) -> Self {
        match err {
            NewsServiceError::NotFound => WebError::NotFound,
            NewsServiceError::Validation(errors) => WebError::BadRequest(errors),
            NewsServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<CommentServiceError> for WebError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::NotFound => WebError::NotFound,
            CommentServiceError::Validation(errors) => WebError::BadRequest(errors),
            CommentServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<NoteServiceError> for WebError {
    fn from(err: NoteServiceError) -> Self {
        match err {
            NoteServiceError::NotFound => WebError::NotFound,
            NoteServiceError::Validation(errors) => WebError::BadRequest(errors),
            NoteServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<UserServiceError> for WebError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::AuthenticationError(message) => {
                let mut errors = FormErrors::new();
                errors.add_non_field(message);
                WebError::BadRequest(errors)
            }
            UserServiceError::Validation(errors) => WebError::BadRequest(errors),
            UserServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}
