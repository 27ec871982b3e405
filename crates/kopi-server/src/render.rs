// SPDX-License-Identifier: Apache-2.0

use crate::cookies::{
    clear_flash_cookie, flash_cookie, read_cookie, Flash, FlashLevel, SESSION_COOKIE,
};
use crate::AppState;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use kopi_model::{SessionToken, User};
use kopi_store::StoreError;
use tera::Context;
use tracing::{error, warn};

/// Per-request page state shared by every render: who is logged in and any
/// one-shot flash left by the previous request.
pub(crate) struct PageShell {
    pub user: Option<User>,
    pub flash: Option<Flash>,
}

pub(crate) async fn session_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<User>, StoreError> {
    let Some(raw) = read_cookie(headers, SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(token) = SessionToken::parse(&raw) else {
        return Ok(None);
    };
    state.store.lock().await.session_user(&token)
}

pub(crate) async fn page_shell(state: &AppState, headers: &HeaderMap) -> PageShell {
    let user = match session_user(state, headers).await {
        Ok(user) => user,
        Err(err) => {
            warn!(error = %err, "session lookup failed; treating request as anonymous");
            None
        }
    };
    PageShell {
        user,
        flash: crate::cookies::read_flash(headers),
    }
}

/// Resolves the authenticated user or produces the login redirect the
/// handler should return as-is.
pub(crate) async fn require_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<User, Response> {
    match session_user(state, headers).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(flash_redirect(
            "/login",
            FlashLevel::Info,
            "Please log in first.",
        )),
        Err(err) => Err(internal_error(&err)),
    }
}

pub(crate) fn base_context(shell: &PageShell) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &shell.user);
    ctx.insert("flash", &shell.flash);
    ctx
}

/// Renders a template into an HTML response, clearing the flash cookie the
/// shell consumed.
pub(crate) fn render_page(
    state: &AppState,
    shell: &PageShell,
    template: &str,
    ctx: &Context,
) -> Response {
    match state.templates.render(template, ctx) {
        Ok(html) => {
            let mut response = Html(html).into_response();
            if shell.flash.is_some() {
                response.headers_mut().append(SET_COOKIE, clear_flash_cookie());
            }
            response
        }
        Err(err) => internal_error(&err),
    }
}

pub(crate) fn internal_error(err: &dyn std::error::Error) -> Response {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Something went wrong. Please try again.</h1>".to_string()),
    )
        .into_response()
}

pub(crate) fn flash_redirect(to: &str, level: FlashLevel, message: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.headers_mut().append(
        SET_COOKIE,
        flash_cookie(&Flash {
            level,
            message: message.to_string(),
        }),
    );
    response
}

/// A store failure on a write becomes a flash on the originating page;
/// internal faults stay a 500.
pub(crate) fn store_error_response(back_to: &str, err: &StoreError) -> Response {
    match err {
        StoreError::Internal(_) => internal_error(err),
        _ => flash_redirect(back_to, FlashLevel::Error, err.message()),
    }
}
