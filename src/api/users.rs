//! Account pages: login, logout and signup

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::errors::WebError;
use super::middleware::{extract_session_token, AppState, Viewer, WebForm, SESSION_COOKIE};
use super::urls;
use crate::models::FormErrors;
use crate::services::{LoginInput, RegisterInput, UserServiceError};

/// Query string of the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: String,
}

/// GET /auth/login/
pub async fn login_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, WebError> {
    let form = LoginInput {
        next: query.next,
        ..LoginInput::default()
    };
    render_login(&state, &viewer, &form, &FormErrors::new())
}

/// POST /auth/login/
pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    WebForm(form): WebForm<LoginInput>,
) -> Result<Response, WebError> {
    let session = match state.user_service.login(&form).await {
        Ok(session) => session,
        Err(UserServiceError::AuthenticationError(message)) => {
            let mut errors = FormErrors::new();
            errors.add_non_field(message);
            return Ok(render_login(&state, &viewer, &form, &errors)?.into_response());
        }
        Err(UserServiceError::Validation(errors)) => {
            return Ok(render_login(&state, &viewer, &form, &errors)?.into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let target = if urls::is_safe_redirect(&form.next) {
        form.next.as_str()
    } else {
        state.config.auth.login_redirect.as_str()
    };

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.id,
        state.config.auth.session_expiration_days * 24 * 60 * 60
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| anyhow::anyhow!("Invalid session cookie: {}", e))?;

    let mut response = urls::found(target);
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

fn render_login(
    state: &AppState,
    viewer: &Viewer,
    form: &LoginInput,
    errors: &FormErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    state.render_form("users/login.html", context, errors, viewer)
}

/// GET|POST /auth/logout/
pub async fn logout(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
        if let Some(ref user) = viewer.user {
            tracing::info!("User {} logged out", user.id);
        }
    }

    let html = state.render(
        "users/logged_out.html",
        &TeraContext::new(),
        &Viewer::anonymous(viewer.path),
    )?;

    let clear_cookie = HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok(([(header::SET_COOKIE, clear_cookie)], html).into_response())
}

/// GET /auth/signup/
pub async fn signup_page(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Html<String>, WebError> {
    render_signup(&state, &viewer, &RegisterInput::default(), &FormErrors::new())
}

/// POST /auth/signup/
pub async fn signup(
    State(state): State<AppState>,
    viewer: Viewer,
    WebForm(form): WebForm<RegisterInput>,
) -> Result<Response, WebError> {
    match state.user_service.register(form.clone()).await {
        Ok(_) => Ok(urls::found(urls::LOGIN)),
        Err(UserServiceError::Validation(errors)) => {
            Ok(render_signup(&state, &viewer, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

fn render_signup(
    state: &AppState,
    viewer: &Viewer,
    form: &RegisterInput,
    errors: &FormErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    state.render_form("users/signup.html", context, errors, viewer)
}
