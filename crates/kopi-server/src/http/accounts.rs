// SPDX-License-Identifier: Apache-2.0

use crate::cookies::{
    clear_session_cookie, read_cookie, session_cookie, FlashLevel, SESSION_COOKIE,
};
use crate::render::{
    base_context, flash_redirect, internal_error, page_shell, render_page, session_user,
    store_error_response,
};
use crate::http::{field, FormFields};
use crate::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Duration;
use kopi_model::{RegistrationDraft, SessionToken, User};
use kopi_store::StoreError;
use tracing::info;

pub(crate) async fn login_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let shell = page_shell(&state, &headers).await;
    if shell.user.is_some() {
        return Redirect::to("/").into_response();
    }
    let ctx = base_context(&shell);
    render_page(&state, &shell, "login.html", &ctx)
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormFields>,
) -> Response {
    if matches!(session_user(&state, &headers).await, Ok(Some(_))) {
        return Redirect::to("/").into_response();
    }
    // the username field carries a username or an email; either identifies
    // the account
    let credentials = field(&form, "username")
        .and_then(|username| field(&form, "password").map(|password| (username, password)));
    let (username, password) = match credentials {
        Ok(pair) => pair,
        Err(err) => return store_error_response("/login", &err),
    };
    let store = state.store.lock().await;
    let user = match store.login(&username, &password) {
        Ok(user) => user,
        Err(err) => return store_error_response("/login", &err),
    };
    let session = match store.create_session(
        user.id,
        Duration::hours(state.config.session_ttl_hours),
    ) {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };
    drop(store);
    info!(user_id = user.id.as_i64(), "login");
    signed_in_response(&state, &user, &session.token, "/")
}

pub(crate) async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(raw) = read_cookie(&headers, SESSION_COOKIE) {
        if let Ok(token) = SessionToken::parse(&raw) {
            if let Err(err) = state.store.lock().await.delete_session(&token) {
                return internal_error(&err);
            }
        }
    }
    let mut response = flash_redirect("/login", FlashLevel::Info, "You have been logged out.");
    response.headers_mut().append(SET_COOKIE, clear_session_cookie());
    response
}

pub(crate) async fn register_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let shell = page_shell(&state, &headers).await;
    if shell.user.is_some() {
        return Redirect::to("/").into_response();
    }
    let ctx = base_context(&shell);
    render_page(&state, &shell, "register.html", &ctx)
}

fn registration_draft(form: &FormFields) -> Result<RegistrationDraft, StoreError> {
    Ok(RegistrationDraft {
        username: field(form, "username")?,
        email: field(form, "email")?,
        password: field(form, "password")?,
    })
}

/// Registration logs the new user straight in, so a session is issued here
/// exactly as at login.
pub(crate) async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormFields>,
) -> Response {
    if matches!(session_user(&state, &headers).await, Ok(Some(_))) {
        return Redirect::to("/").into_response();
    }
    let draft = match registration_draft(&form) {
        Ok(draft) => draft,
        Err(err) => return store_error_response("/register", &err),
    };
    let store = state.store.lock().await;
    let user = match store.register(&draft) {
        Ok(user) => user,
        Err(err) => return store_error_response("/register", &err),
    };
    let session = match store.create_session(
        user.id,
        Duration::hours(state.config.session_ttl_hours),
    ) {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };
    drop(store);
    info!(user_id = user.id.as_i64(), "registration");
    signed_in_response(&state, &user, &session.token, "/")
}

fn signed_in_response(
    state: &AppState,
    user: &User,
    token: &SessionToken,
    to: &str,
) -> Response {
    let mut response = flash_redirect(
        to,
        FlashLevel::Success,
        &format!("Welcome, {}!", user.username),
    );
    response.headers_mut().append(
        SET_COOKIE,
        session_cookie(token.as_str(), state.config.cookie_secure),
    );
    response
}
