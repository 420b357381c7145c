//! Notes pages
//!
//! Everything except the landing page requires login, and a note is only
//! reachable by its author.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tera::Context as TeraContext;

use super::errors::WebError;
use super::middleware::{AppState, AuthenticatedUser, Viewer, WebForm};
use super::urls;
use crate::models::{FormErrors, Note, NoteForm};
use crate::services::NoteServiceError;

/// GET /notes/
pub async fn home(State(state): State<AppState>, viewer: Viewer) -> Result<Html<String>, WebError> {
    state.render("notes/home.html", &TeraContext::new(), &viewer)
}

/// GET /notes/list/
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
) -> Result<Html<String>, WebError> {
    let notes = state.note_service.list_for(&user).await?;

    let mut context = TeraContext::new();
    context.insert("notes", &notes);
    state.render("notes/list.html", &context, &viewer)
}

/// GET /notes/add/
pub async fn add_page(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    viewer: Viewer,
) -> Result<Html<String>, WebError> {
    render_form(&state, &viewer, None, &NoteForm::default(), &FormErrors::new())
}

/// POST /notes/add/
pub async fn add(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    WebForm(form): WebForm<NoteForm>,
) -> Result<Response, WebError> {
    match state.note_service.create(&user, &form).await {
        Ok(_) => Ok(urls::found(urls::NOTES_SUCCESS)),
        Err(NoteServiceError::Validation(errors)) => {
            Ok(render_form(&state, &viewer, None, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/note/{slug}/
pub async fn detail(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError> {
    let note = state.note_service.get_owned(&slug, &user).await?;

    let mut context = TeraContext::new();
    context.insert("note", &note);
    state.render("notes/detail.html", &context, &viewer)
}

/// GET /notes/edit/{slug}/
pub async fn edit_page(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError> {
    let note = state.note_service.get_owned(&slug, &user).await?;
    render_form(&state, &viewer, Some(&note), &NoteForm::from(&note), &FormErrors::new())
}

/// POST /notes/edit/{slug}/
pub async fn edit(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(slug): Path<String>,
    WebForm(form): WebForm<NoteForm>,
) -> Result<Response, WebError> {
    match state.note_service.update(&slug, &user, &form).await {
        Ok(_) => Ok(urls::found(urls::NOTES_SUCCESS)),
        Err(NoteServiceError::Validation(errors)) => {
            let note = state.note_service.get_owned(&slug, &user).await?;
            Ok(render_form(&state, &viewer, Some(&note), &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/delete/{slug}/
pub async fn delete_page(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError> {
    let note = state.note_service.get_owned(&slug, &user).await?;

    let mut context = TeraContext::new();
    context.insert("note", &note);
    state.render("notes/delete.html", &context, &viewer)
}

/// POST|DELETE /notes/delete/{slug}/
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.note_service.delete(&slug, &user).await?;
    Ok(urls::found(urls::NOTES_SUCCESS))
}

/// GET /notes/done/
pub async fn success(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    viewer: Viewer,
) -> Result<Html<String>, WebError> {
    state.render("notes/success.html", &TeraContext::new(), &viewer)
}

fn render_form(
    state: &AppState,
    viewer: &Viewer,
    note: Option<&Note>,
    form: &NoteForm,
    errors: &FormErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    if let Some(note) = note {
        context.insert("note", note);
    }
    state.render_form("notes/form.html", context, errors, viewer)
}
