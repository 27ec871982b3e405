// SPDX-License-Identifier: Apache-2.0

use crate::cookies::FlashLevel;
use crate::render::{
    base_context, flash_redirect, internal_error, page_shell, render_page, store_error_response,
};
use crate::http::{field, int_field, FormFields};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;
use kopi_model::{ContactDraft, ReviewDraft};
use kopi_store::StoreError;

const RECENT_REVIEWS_SHOWN: usize = 6;

pub(crate) async fn contact_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let shell = page_shell(&state, &headers).await;
    let ctx = base_context(&shell);
    render_page(&state, &shell, "contact.html", &ctx)
}

fn contact_draft(form: &FormFields) -> Result<ContactDraft, StoreError> {
    Ok(ContactDraft {
        name: field(form, "name")?,
        email: field(form, "email")?,
        subject: field(form, "subject")?,
        message: field(form, "message")?,
    })
}

pub(crate) async fn submit_contact_handler(
    State(state): State<AppState>,
    Form(form): Form<FormFields>,
) -> Response {
    let draft = match contact_draft(&form) {
        Ok(draft) => draft,
        Err(err) => return store_error_response("/contact", &err),
    };
    match state.store.lock().await.create_contact_message(&draft) {
        Ok(_) => flash_redirect("/contact", FlashLevel::Success, "Message sent successfully!"),
        Err(err) => store_error_response("/contact", &err),
    }
}

pub(crate) async fn review_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let reviews = match state
        .store
        .lock()
        .await
        .recent_reviews(RECENT_REVIEWS_SHOWN)
    {
        Ok(reviews) => reviews,
        Err(err) => return internal_error(&err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("reviews", &reviews);
    render_page(&state, &shell, "review.html", &ctx)
}

fn review_draft(form: &FormFields) -> Result<ReviewDraft, StoreError> {
    Ok(ReviewDraft {
        name: field(form, "name")?,
        // Optional path into the media directory; uploads themselves are not
        // handled here.
        image: form.get("image").cloned().filter(|path| !path.trim().is_empty()),
        rating: int_field(form, "rating")?,
        message: field(form, "message")?,
    })
}

pub(crate) async fn submit_review_handler(
    State(state): State<AppState>,
    Form(form): Form<FormFields>,
) -> Response {
    let draft = match review_draft(&form) {
        Ok(draft) => draft,
        Err(err) => return store_error_response("/review", &err),
    };
    match state.store.lock().await.create_review(&draft) {
        Ok(_) => flash_redirect("/thankyou", FlashLevel::Success, "Thanks for your review!"),
        Err(err) => store_error_response("/review", &err),
    }
}
