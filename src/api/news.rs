//! News pages
//!
//! - `GET /news/` - latest news
//! - `GET /news/{id}/` - news item with its comments
//! - `POST /news/{id}/` - add a comment (login required)
//! - `GET|POST /news/edit_comment/{id}/` - edit own comment
//! - `GET|POST /news/delete_comment/{id}/` - delete own comment

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tera::Context as TeraContext;

use super::errors::WebError;
use super::middleware::{AppState, AuthenticatedUser, Viewer, WebForm};
use super::{parse_id, urls};
use crate::models::{CommentForm, FormErrors};
use crate::services::CommentServiceError;

/// GET /news/
pub async fn home(State(state): State<AppState>, viewer: Viewer) -> Result<Html<String>, WebError> {
    let news_list = state.news_service.home().await?;

    let mut context = TeraContext::new();
    context.insert("news_list", &news_list);
    state.render("news/home.html", &context, &viewer)
}

/// GET /news/{id}/
pub async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = parse_id(&id)?;
    render_detail(&state, &viewer, id, &CommentForm::default(), &FormErrors::new()).await
}

/// POST /news/{id}/
pub async fn add_comment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(id): Path<String>,
    WebForm(form): WebForm<CommentForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id)?;

    match state.comment_service.create(id, &user, &form).await {
        Ok(_) => Ok(urls::found(&urls::news_comments(id))),
        Err(CommentServiceError::Validation(errors)) => {
            Ok(render_detail(&state, &viewer, id, &form, &errors).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_detail(
    state: &AppState,
    viewer: &Viewer,
    news_id: i64,
    form: &CommentForm,
    errors: &FormErrors,
) -> Result<Html<String>, WebError> {
    let news = state.news_service.get(news_id).await?;
    let comments = state.comment_service.list_for_news(news.id).await?;

    let mut context = TeraContext::new();
    context.insert("news", &news);
    context.insert("comments", &comments);
    context.insert("form", form);
    state.render_form("news/detail.html", context, errors, viewer)
}

/// GET /news/edit_comment/{id}/
pub async fn edit_comment_page(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let comment = state.comment_service.get_owned(parse_id(&id)?, &user).await?;

    let mut context = TeraContext::new();
    context.insert("form", &CommentForm::from(&comment));
    context.insert("comment", &comment);
    state.render_form("news/comment_edit.html", context, &FormErrors::new(), &viewer)
}

/// POST /news/edit_comment/{id}/
pub async fn edit_comment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(id): Path<String>,
    WebForm(form): WebForm<CommentForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id)?;

    match state.comment_service.update(id, &user, &form).await {
        Ok(comment) => Ok(urls::found(&urls::news_comments(comment.news_id))),
        Err(CommentServiceError::Validation(errors)) => {
            let comment = state.comment_service.get_owned(id, &user).await?;
            let mut context = TeraContext::new();
            context.insert("form", &form);
            context.insert("comment", &comment);
            Ok(state
                .render_form("news/comment_edit.html", context, &errors, &viewer)?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /news/delete_comment/{id}/
pub async fn delete_comment_page(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let comment = state.comment_service.get_owned(parse_id(&id)?, &user).await?;

    let mut context = TeraContext::new();
    context.insert("comment", &comment);
    state.render("news/comment_delete.html", &context, &viewer)
}

/// POST /news/delete_comment/{id}/
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let comment = state.comment_service.delete(parse_id(&id)?, &user).await?;
    Ok(urls::found(&urls::news_comments(comment.news_id)))
}
