//! Site URLs
//!
//! Route patterns for the router and helpers that build concrete links.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const ROOT: &str = "/";

pub const NEWS_HOME: &str = "/news/";
pub const NEWS_DETAIL: &str = "/news/{id}/";
pub const NEWS_EDIT: &str = "/news/edit_comment/{id}/";
pub const NEWS_DELETE: &str = "/news/delete_comment/{id}/";

pub const NOTES_HOME: &str = "/notes/";
pub const NOTES_LIST: &str = "/notes/list/";
pub const NOTES_ADD: &str = "/notes/add/";
pub const NOTES_DETAIL: &str = "/notes/note/{slug}/";
pub const NOTES_EDIT: &str = "/notes/edit/{slug}/";
pub const NOTES_DELETE: &str = "/notes/delete/{slug}/";
pub const NOTES_SUCCESS: &str = "/notes/done/";

pub const LOGIN: &str = "/auth/login/";
pub const LOGOUT: &str = "/auth/logout/";
pub const SIGNUP: &str = "/auth/signup/";

pub fn news_detail(id: i64) -> String {
    format!("/news/{}/", id)
}

/// News page scrolled to its comment thread
pub fn news_comments(id: i64) -> String {
    format!("/news/{}/#comments", id)
}

pub fn comment_edit(id: i64) -> String {
    format!("/news/edit_comment/{}/", id)
}

pub fn comment_delete(id: i64) -> String {
    format!("/news/delete_comment/{}/", id)
}

pub fn note_detail(slug: &str) -> String {
    format!("/notes/note/{}/", slug)
}

pub fn note_edit(slug: &str) -> String {
    format!("/notes/edit/{}/", slug)
}

pub fn note_delete(slug: &str) -> String {
    format!("/notes/delete/{}/", slug)
}

/// Login page that returns to `next` afterwards. Slashes stay readable.
pub fn login_with_next(next: &str) -> String {
    format!(
        "{}?next={}",
        LOGIN,
        urlencoding::encode(next).replace("%2F", "/")
    )
}

/// Only same-site paths are followed after login
pub fn is_safe_redirect(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

/// 302 Found to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
