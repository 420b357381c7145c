//! HTTP layer - HTML pages and routing
//!
//! One router serves both sites and the shared account pages:
//! - `/news/...` - news feed and comments
//! - `/notes/...` - personal notes
//! - `/auth/...` - login, logout and signup

pub mod errors;
pub mod middleware;
pub mod news;
pub mod notes;
pub mod urls;
pub mod users;

use axum::{
    middleware as axum_middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use errors::WebError;
pub use middleware::{AppState, AuthenticatedUser, Viewer};

/// Parse a numeric path segment; anything else is a missing page
pub(crate) fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse().map_err(|_| WebError::NotFound)
}

/// GET /
async fn root() -> Response {
    urls::found(urls::NEWS_HOME)
}

async fn not_found() -> WebError {
    WebError::NotFound
}

/// Build the site router
pub fn build_site_router(state: AppState) -> Router<AppState> {
    let login_required = || axum_middleware::from_fn(middleware::require_login);

    // Routes that are entirely behind login
    let protected_routes = Router::new()
        .route(
            urls::NEWS_EDIT,
            get(news::edit_comment_page).post(news::edit_comment),
        )
        .route(
            urls::NEWS_DELETE,
            get(news::delete_comment_page).post(news::delete_comment),
        )
        .route(urls::NOTES_LIST, get(notes::list))
        .route(urls::NOTES_ADD, get(notes::add_page).post(notes::add))
        .route(urls::NOTES_DETAIL, get(notes::detail))
        .route(urls::NOTES_EDIT, get(notes::edit_page).post(notes::edit))
        .route(
            urls::NOTES_DELETE,
            get(notes::delete_page)
                .post(notes::delete)
                .delete(notes::delete),
        )
        .route(urls::NOTES_SUCCESS, get(notes::success))
        .route_layer(login_required());

    // Public routes
    Router::new()
        .route(urls::ROOT, get(root))
        .route(urls::NEWS_HOME, get(news::home))
        .route(
            urls::NEWS_DETAIL,
            get(news::detail).merge(post(news::add_comment).route_layer(login_required())),
        )
        .route(urls::NOTES_HOME, get(notes::home))
        .route(urls::LOGIN, get(users::login_page).post(users::login))
        .route(urls::LOGOUT, get(users::logout).post(users::logout))
        .route(urls::SIGNUP, get(users::signup_page).post(users::signup))
        .merge(protected_routes)
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::error_pages,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::optional_auth,
        ))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    build_site_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
