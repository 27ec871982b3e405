// SPDX-License-Identifier: Apache-2.0

use crate::cookies::FlashLevel;
use crate::render::{
    base_context, flash_redirect, internal_error, page_shell, render_page, require_user,
    store_error_response,
};
use crate::http::FormFields;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use kopi_model::{CoffeeId, Selection};
use kopi_store::StoreError;

pub(crate) async fn order_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(redirect) = require_user(&state, &headers).await {
        return redirect;
    }
    let coffees = match state.store.lock().await.list_coffees() {
        Ok(coffees) => coffees,
        Err(err) => return internal_error(&err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("coffees", &coffees);
    render_page(&state, &shell, "order.html", &ctx)
}

/// Cart fields arrive as `quantity_{coffee_id}` pairs, one per catalog row.
/// Blank means zero; zero-quantity rows never become items.
fn parse_selections(form: &FormFields) -> Result<Vec<Selection>, StoreError> {
    let mut selections = Vec::new();
    for (key, value) in form {
        let Some(raw_id) = key.strip_prefix("quantity_") else {
            continue;
        };
        let coffee_id = CoffeeId::parse(raw_id)
            .map_err(|_| StoreError::Validation("malformed cart field".to_string()))?;
        let trimmed = value.trim();
        let quantity = if trimmed.is_empty() {
            0
        } else {
            trimmed
                .parse::<u32>()
                .map_err(|_| StoreError::Validation("quantities must be whole numbers".to_string()))?
        };
        selections.push(Selection {
            coffee_id,
            quantity,
        });
    }
    Ok(selections)
}

pub(crate) async fn place_order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormFields>,
) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let selections = match parse_selections(&form) {
        Ok(selections) => selections,
        Err(err) => return store_error_response("/order", &err),
    };
    match state.store.lock().await.place_order(user.id, &selections) {
        Ok(_) => flash_redirect("/payment", FlashLevel::Success, "Order placed successfully!"),
        Err(err @ StoreError::Validation(_)) => store_error_response("/order", &err),
        Err(err) => store_error_response("/menu", &err),
    }
}

pub(crate) async fn payment_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let latest = match state.store.lock().await.latest_order_for_user(user.id) {
        Ok(latest) => latest,
        Err(err) => return internal_error(&err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("latest_order", &latest);
    render_page(&state, &shell, "payments.html", &ctx)
}

/// A POST to the payment page is forwarded to `/confirm-payment` with the
/// method and body preserved.
pub(crate) async fn payment_submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(redirect) = require_user(&state, &headers).await {
        return redirect;
    }
    Redirect::temporary("/confirm-payment").into_response()
}

/// Mock payment confirmation. Nothing is validated, no gateway is called,
/// and no payment record is stored; submission renders the success page.
pub(crate) async fn confirm_payment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(_form): Form<FormFields>,
) -> Response {
    if let Err(redirect) = require_user(&state, &headers).await {
        return redirect;
    }
    let shell = page_shell(&state, &headers).await;
    let ctx = base_context(&shell);
    render_page(&state, &shell, "order_success.html", &ctx)
}

pub(crate) async fn my_orders_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let orders = match state.store.lock().await.orders_for_user(user.id) {
        Ok(orders) => orders,
        Err(err) => return internal_error(&err),
    };
    let shell = page_shell(&state, &headers).await;
    let mut ctx = base_context(&shell);
    ctx.insert("orders", &orders);
    render_page(&state, &shell, "my_orders.html", &ctx)
}
