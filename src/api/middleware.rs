//! API middleware
//!
//! Contains middleware and extractors for:
//! - Session cookie resolution (`optional_auth`)
//! - Login-only routes (`require_login`)
//! - Rendering error responses with the site templates (`error_pages`)

use axum::{
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use tera::Context as TeraContext;

use super::errors::{ErrorPage, WebError};
use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNewsRepository, SqlxNoteRepository, SqlxSessionRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{FormErrors, User};
use crate::services::{CommentService, NewsService, NoteService, UserService};
use crate::theme::{CurrentUser, StandardTemplateVars, ThemeEngine};

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub comment_service: Arc<CommentService>,
    pub note_service: Arc<NoteService>,
    pub theme_engine: Arc<ThemeEngine>,
}

impl AppState {
    /// Wire repositories and services on top of a migrated pool
    pub fn new(pool: DynDatabasePool, config: Config) -> anyhow::Result<Self> {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());
        let note_repo = SqlxNoteRepository::boxed(pool);

        let theme_engine = match config.theme.path {
            Some(ref path) => ThemeEngine::with_overrides(path)?,
            None => ThemeEngine::new()?,
        };

        Ok(Self {
            user_service: Arc::new(UserService::with_session_expiration(
                user_repo,
                session_repo,
                config.auth.session_expiration_days,
            )),
            news_service: Arc::new(NewsService::with_page_size(
                news_repo.clone(),
                config.news.count_on_home_page,
            )),
            comment_service: Arc::new(CommentService::new(news_repo, comment_repo)),
            note_service: Arc::new(NoteService::new(note_repo)),
            theme_engine: Arc::new(theme_engine),
            config: Arc::new(config),
        })
    }

    /// Render a page for `viewer` with the standard template variables
    pub fn render(
        &self,
        template: &str,
        context: &TeraContext,
        viewer: &Viewer,
    ) -> Result<Html<String>, WebError> {
        let html = self.theme_engine.render_with_standard_vars(
            template,
            context,
            &viewer.template_vars(&self.config),
        )?;
        Ok(Html(html))
    }

    /// Render a form page, always providing `errors` to the template
    pub fn render_form(
        &self,
        template: &str,
        mut context: TeraContext,
        errors: &FormErrors,
        viewer: &Viewer,
    ) -> Result<Html<String>, WebError> {
        context.insert("errors", errors);
        self.render(template, &context, viewer)
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| WebError::LoginRequired(original_path(parts)))
    }
}

/// URL-encoded form body; unreadable bodies get the site's error page
#[derive(Debug, Clone)]
pub struct WebForm<T>(pub T);

impl<S, T> FromRequest<S> for WebForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(request, state)
            .await
            .map_err(|rejection| WebError::UnreadableBody(rejection.status(), rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Who is looking at a page: the logged-in user (if any) and the path
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: Option<User>,
    pub path: String,
}

impl Viewer {
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self {
            user: None,
            path: path.into(),
        }
    }

    /// Standard template variables for this viewer
    pub fn template_vars(&self, config: &Config) -> StandardTemplateVars {
        let vars = StandardTemplateVars::new(config.theme.site_name.clone(), self.path.clone());
        match self.user {
            Some(ref user) => vars.with_user(CurrentUser::from(user)),
            None => vars,
        }
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            user: parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|authenticated| authenticated.0.clone()),
            path: parts.uri.path().to_string(),
        })
    }
}

/// Path and query of the request, as sent by the client
fn original_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

/// Extract the session token from the `session` cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolve the session cookie to a user for every request
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session"),
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }
    next.run(request).await
}

/// Send anonymous visitors to the login page, remembering where they were going
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        let (parts, _) = request.into_parts();
        return WebError::LoginRequired(original_path(&parts)).into_response();
    }
    next.run(request).await
}

/// Replace the plain body of error responses with the templated error page
pub async fn error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let viewer = Viewer {
        user: request
            .extensions()
            .get::<AuthenticatedUser>()
            .map(|authenticated| authenticated.0.clone()),
        path: request.uri().path().to_string(),
    };

    let response = next.run(request).await;
    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let mut context = TeraContext::new();
    context.insert("status", &page.status.as_u16());
    context.insert("message", &page.message);

    match state.render("error.html", &context, &viewer) {
        Ok(html) => (page.status, html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render error page: {}", e);
            response
        }
    }
}
