// SPDX-License-Identifier: Apache-2.0

use crate::cookies::FlashLevel;
use crate::render::{
    base_context, flash_redirect, internal_error, page_shell, render_page, require_user,
    store_error_response,
};
use crate::http::{field, int_field, FormFields};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use kopi_model::{CoffeeId, ReviewDraft};
use serde_json::json;

pub(crate) async fn healthz_handler() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

pub(crate) async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    catalog_page(state, headers, "index.html").await
}

pub(crate) async fn menu_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    catalog_page(state, headers, "menu.html").await
}

async fn catalog_page(state: AppState, headers: HeaderMap, template: &str) -> Response {
    let coffees = match state.store.lock().await.list_coffees() {
        Ok(coffees) => coffees,
        Err(err) => return internal_error(&err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("coffees", &coffees);
    render_page(&state, &shell, template, &ctx)
}

pub(crate) async fn coffee_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Ok(id) = CoffeeId::parse(&id) else {
        return flash_redirect("/menu", FlashLevel::Error, "Unknown coffee.");
    };
    let coffee = match state.store.lock().await.get_coffee(id) {
        Ok(coffee) => coffee,
        Err(err) => return store_error_response("/menu", &err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("coffee", &coffee);
    render_page(&state, &shell, "coffee_detail.html", &ctx)
}

/// Review submission from a coffee's detail page. The review is recorded
/// under the logged-in user's name.
pub(crate) async fn coffee_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<FormFields>,
) -> Response {
    let Ok(id) = CoffeeId::parse(&id) else {
        return flash_redirect("/menu", FlashLevel::Error, "Unknown coffee.");
    };
    let back_to = format!("/coffee/{id}");
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let fields = int_field(&form, "rating")
        .and_then(|rating| field(&form, "comment").map(|comment| (rating, comment)));
    let (rating, comment) = match fields {
        Ok(pair) => pair,
        Err(err) => return store_error_response(&back_to, &err),
    };
    let draft = ReviewDraft {
        name: user.username,
        image: None,
        rating,
        message: comment,
    };
    match state.store.lock().await.create_review(&draft) {
        Ok(_) => flash_redirect(&back_to, FlashLevel::Success, "Review submitted successfully."),
        Err(err) => store_error_response(&back_to, &err),
    }
}

pub(crate) async fn thankyou_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let shell = page_shell(&state, &headers).await;
    let ctx = base_context(&shell);
    render_page(&state, &shell, "thankyou.html", &ctx)
}
