// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use kopi_model::{CoffeeDraft, Price};
use kopi_server::{build_router, AppState, ServerConfig};
use kopi_store::Store;
use tower::ServiceExt;

fn test_app() -> Router {
    let store = Store::open_in_memory().expect("in-memory store");
    store
        .create_coffee(&CoffeeDraft {
            name: "Espresso".to_string(),
            price: Price::parse("2.10").unwrap(),
            description: "A short, strong shot.".to_string(),
            image: "coffee_images/espresso.jpg".to_string(),
        })
        .expect("seed coffee");
    let templates = tera::Tera::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/templates/**/*.html"
    ))
    .expect("load templates");
    build_router(AppState::new(store, templates, ServerConfig::default()))
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(
    app: &Router,
    path: &str,
    body: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn has_flash(response: &axum::response::Response) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap_or_default().starts_with("kopi_flash="))
}

/// Pulls the session cookie pair out of a login/register response.
fn session_cookie_of(response: &axum::response::Response) -> Option<String> {
    for value in response.headers().get_all(header::SET_COOKIE) {
        let raw = value.to_str().ok()?;
        if raw.starts_with("kopi_session=") && !raw.starts_with("kopi_session=;") {
            return Some(raw.split(';').next()?.to_string());
        }
    }
    None
}

async fn register(app: &Router, username: &str) -> String {
    let response = post_form(
        app,
        "/register",
        &format!("username={username}&email={username}%40example.com&password=longenough"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie_of(&response).expect("registration issues a session cookie")
}

#[tokio::test]
async fn landing_and_menu_show_the_catalog() {
    let app = test_app();

    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Espresso"));

    let response = get(&app, "/menu", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Espresso"));
    assert!(html.contains("2.10"));
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app();
    let response = get(&app, "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("ok"));
}

#[tokio::test]
async fn protected_pages_redirect_anonymous_visitors_to_login() {
    let app = test_app();
    for path in ["/order", "/payment", "/my_orders"] {
        let response = get(&app, path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/login", "{path}");
    }
}

#[tokio::test]
async fn register_order_and_review_my_orders_end_to_end() {
    let app = test_app();
    let cookie = register(&app, "mia").await;

    // the nav now shows the session
    let html = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(html.contains("mia"));

    // submit a cart; the seeded coffee has id 1
    let response = post_form(&app, "/order", "quantity_1=2", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/payment");

    let html = body_text(get(&app, "/payment", Some(&cookie)).await).await;
    assert!(html.contains("Espresso"));
    assert!(html.contains("4.20"));

    let html = body_text(get(&app, "/my_orders", Some(&cookie)).await).await;
    assert!(html.contains("Espresso"));
    assert!(html.contains("pending"));
    assert!(html.contains("4.20"));
}

#[tokio::test]
async fn an_empty_cart_bounces_back_to_the_order_form() {
    let app = test_app();
    let cookie = register(&app, "mia").await;

    let response = post_form(&app, "/order", "quantity_1=0", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/order");
}

#[tokio::test]
async fn mock_payment_confirmation_renders_success_without_persisting_anything() {
    let app = test_app();
    let cookie = register(&app, "mia").await;
    post_form(&app, "/order", "quantity_1=1", Some(&cookie)).await;

    let response = post_form(
        &app,
        "/confirm-payment",
        "name=Mia&card=4242424242424242&expiry=12%2F30&cvv=123",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Payment accepted"));

    // the stub validates nothing, so even an empty submission succeeds
    let response = post_form(&app, "/confirm-payment", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn posting_the_payment_page_forwards_to_confirmation() {
    let app = test_app();
    let cookie = register(&app, "mia").await;
    post_form(&app, "/order", "quantity_1=1", Some(&cookie)).await;

    let response = post_form(
        &app,
        "/payment",
        "name=Mia&card=4242424242424242&expiry=12%2F30&cvv=123",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/confirm-payment");
}

#[tokio::test]
async fn login_failures_redirect_with_a_generic_message() {
    let app = test_app();
    register(&app, "mia").await;

    let response = post_form(&app, "/login", "username=mia&password=wrong", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(session_cookie_of(&response).is_none());

    // a valid login via email works
    let response = post_form(
        &app,
        "/login",
        "username=mia%40example.com&password=longenough",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(session_cookie_of(&response).is_some());
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = test_app();
    let cookie = register(&app, "mia").await;

    let response = post_form(&app, "/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // the old token no longer authenticates
    let response = get(&app, "/my_orders", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn public_review_and_contact_forms_accept_submissions() {
    let app = test_app();

    let response = post_form(
        &app,
        "/review",
        "name=Sam&rating=5&message=Great+crema&image=",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/thankyou");

    let html = body_text(get(&app, "/review", None).await).await;
    assert!(html.contains("Sam"));
    assert!(html.contains("Great crema"));

    let response = post_form(
        &app,
        "/contact",
        "name=Sam&email=sam%40example.com&subject=Hours&message=Open+Sundays%3F",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contact");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app();
    let response = get(&app, "/", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn missing_contact_fields_flash_an_error_instead_of_failing_raw() {
    let app = test_app();
    let response = post_form(
        &app,
        "/contact",
        "name=&email=sam%40example.com&subject=Hours&message=hello",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contact");
    assert!(has_flash(&response));
}

#[tokio::test]
async fn absent_form_fields_flash_an_error_instead_of_a_raw_rejection() {
    let app = test_app();

    // the name key is absent entirely, not just empty
    let response = post_form(
        &app,
        "/contact",
        "email=sam%40example.com&subject=Hours&message=hello",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contact");
    assert!(has_flash(&response));

    let response = post_form(&app, "/login", "username=mia", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(has_flash(&response));

    let response = post_form(
        &app,
        "/register",
        "username=mia&email=mia%40example.com",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
    assert!(has_flash(&response));

    let response = post_form(&app, "/review", "name=Sam&message=hi", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/review");
    assert!(has_flash(&response));
}
