// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! HTTP surface for the Kopi storefront.
//!
//! Server-rendered pages over the store: catalog browsing, cart submission,
//! a mock payment flow, session auth, reviews, and a contact form. Every
//! failed write becomes a flash message plus a redirect; raw errors never
//! reach a client.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use kopi_store::Store;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tera::Tera;
use tokio::sync::Mutex;

mod config;
mod cookies;
mod http;
mod render;
mod tracing_middleware;

pub use config::ServerConfig;

pub const CRATE_NAME: &str = "kopi-server";

#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<Mutex<Store>>,
    pub(crate) templates: Arc<Tera>,
    pub(crate) config: ServerConfig,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store, templates: Tera, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            templates: Arc::new(templates),
            config,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::pages::index_handler))
        .route("/healthz", get(http::pages::healthz_handler))
        .route("/menu", get(http::pages::menu_handler))
        .route(
            "/coffee/:id",
            get(http::pages::coffee_detail_handler).post(http::pages::coffee_review_handler),
        )
        .route(
            "/order",
            get(http::orders::order_form_handler).post(http::orders::place_order_handler),
        )
        .route(
            "/payment",
            get(http::orders::payment_page_handler).post(http::orders::payment_submit_handler),
        )
        .route(
            "/confirm-payment",
            post(http::orders::confirm_payment_handler),
        )
        .route("/my_orders", get(http::orders::my_orders_handler))
        .route(
            "/contact",
            get(http::feedback::contact_page_handler).post(http::feedback::submit_contact_handler),
        )
        .route(
            "/login",
            get(http::accounts::login_page_handler).post(http::accounts::login_handler),
        )
        .route("/logout", post(http::accounts::logout_handler))
        .route(
            "/register",
            get(http::accounts::register_page_handler).post(http::accounts::register_handler),
        )
        .route(
            "/review",
            get(http::feedback::review_page_handler).post(http::feedback::submit_review_handler),
        )
        .route("/thankyou", get(http::pages::thankyou_handler))
        .layer(from_fn_with_state(
            state.clone(),
            tracing_middleware::request_tracing_middleware,
        ))
        .with_state(state)
}
