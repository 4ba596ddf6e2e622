//! Route definitions
//!
//! Public pages and the cart are open; the editor and order pages sit
//! behind the session gate, the download API behind the bearer token.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{api, auth, cart, edit, orders, pages};
use crate::middleware::api_token::require_api_token;
use crate::middleware::auth::require_session;
use crate::server::AppState;

/// Create the application router
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(pages::health))
        .route("/", get(pages::home))
        .route("/gallery", get(pages::gallery))
        .route("/gallery/{id}", get(pages::gallery_single))
        .route("/prints", get(pages::prints))
        .route("/buyart", get(pages::buy_art))
        .route("/about", get(pages::about))
        .route("/modal/close", get(pages::close_modal));

    let shop = Router::new()
        .route("/cart", get(cart::cart_page))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/remove", post(cart::remove_from_cart))
        .route("/cart/{id}/quantity", put(cart::change_quantity))
        .route("/cart/checkout", post(cart::checkout))
        .route("/cart/thanks", get(cart::thanks));

    let login = Router::new()
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/logout", post(auth::logout));

    let admin = Router::new()
        .route("/edit", get(edit::edit))
        .route("/edit/resetorder", get(edit::reset_order))
        .route("/edit/art", post(edit::create_art))
        .route("/edit/art/modal/new", get(edit::new_art_modal))
        .route("/edit/art/modal/{id}", get(edit::edit_art_modal))
        .route("/edit/art/{id}", patch(edit::patch_art).delete(edit::delete_art))
        .route("/edit/art/{id}/{field}", patch(edit::patch_art_field))
        .route("/edit/storedtext/modal/{id}", get(edit::stored_text_modal))
        .route("/edit/storedtext/{id}", put(edit::update_stored_text))
        .route("/edit/print", post(edit::create_print))
        .route("/edit/print/{id}", patch(edit::patch_print).delete(edit::delete_print))
        .route("/orders", get(orders::orders_page))
        .route("/orders/{order_id}/update_status", post(orders::update_status))
        .route(
            "/orders/{order_id}/row/{row_id}/toggle_paid",
            post(orders::toggle_paid),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let api = Router::new()
        .route("/api/db", get(api::download_db))
        .route("/api/db-shm", get(api::download_db_shm))
        .route("/api/db-wal", get(api::download_db_wal))
        .route_layer(from_fn_with_state(state, require_api_token));

    Router::new()
        .merge(public)
        .merge(shop)
        .merge(login)
        .merge(admin)
        .merge(api)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use atelier_core::cart::MAX_QUANTITY;
    use atelier_core::db::{NewArt, NewPrint};
    use atelier_core::{
        Config, Database, Error, LogNotifier, Notifier, Order, OrderRow, OrderStatus, SessionStore,
    };

    use crate::server::{app, AppState};

    const FORM: &str = "application/x-www-form-urlencoded";

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_order(&self, order: &Order) -> atelier_core::Result<()> {
            self.sent.lock().unwrap().push(order.order_id.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_order(&self, _order: &Order) -> atelier_core::Result<()> {
            Err(Error::Notify("smtp relay unreachable".to_string()))
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.api.token = Some("secret".to_string());
        config
    }

    fn state_with(db: Database, notifier: Arc<dyn Notifier>) -> AppState {
        AppState::new(test_config(), db, Arc::new(SessionStore::new()), notifier)
    }

    fn test_state() -> AppState {
        state_with(Database::in_memory().unwrap(), Arc::new(LogNotifier))
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        app(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn form(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    /// `name=value` of the first Set-Cookie header for `name`
    fn set_cookie(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{}=", name)))
            .map(str::to_string)
    }

    async fn login_cookie(state: &AppState) -> String {
        let response = send(
            state,
            form("POST", "/login", "username=admin&password=password", None),
        )
        .await;
        set_cookie(&response, "session_token").unwrap()
    }

    async fn add_print(state: &AppState, title: &str, price: f64) -> String {
        state
            .db
            .add_print(NewPrint {
                title: title.to_string(),
                price,
                quantity_left: 5,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&test_state(), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn test_theme_trigger_and_fragments() {
        let state = test_state();

        let home = send(&state, get("/")).await;
        assert_eq!(home.headers()["HX-Trigger"], "pageThemeDark");
        assert!(body_string(home).await.starts_with("<!DOCTYPE html>"));

        let fragment = send(
            &state,
            Request::get("/about")
                .header("HX-Request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(fragment.headers()["HX-Trigger"], "pageThemeLight");
        let body = body_string(fragment).await;
        assert!(!body.contains("<html"));
        assert!(body.contains("About me"));
    }

    #[tokio::test]
    async fn test_gallery_unknown_art_is_404() {
        let response = send(&test_state(), get("/gallery/does-not-exist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_requires_session() {
        let response = send(&test_state(), get("/edit")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?redirect_to=%2Fedit"
        );
    }

    #[tokio::test]
    async fn test_bad_login_shows_error() {
        let response = send(
            &test_state(),
            form("POST", "/login", "username=admin&password=nope", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response, "session_token").is_none());
        assert!(body_string(response).await.contains("Wrong username or password."));
    }

    #[tokio::test]
    async fn test_login_then_edit() {
        let state = test_state();
        let response = send(
            &state,
            form("POST", "/login", "username=admin&password=password", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/edit");
        let cookie = set_cookie(&response, "session_token").unwrap();

        let edit = send(&state, get_with_cookie("/edit", &cookie)).await;
        assert_eq!(edit.status(), StatusCode::OK);
        assert!(body_string(edit).await.contains("<h1>Edit</h1>"));
    }

    #[tokio::test]
    async fn test_login_redirect_target() {
        let state = test_state();

        let local = send(
            &state,
            form(
                "POST",
                "/login",
                "username=admin&password=password&redirect_to=%2Forders",
                None,
            ),
        )
        .await;
        assert_eq!(local.headers()["HX-Redirect"], "/orders");

        let foreign = send(
            &state,
            form(
                "POST",
                "/login",
                "username=admin&password=password&redirect_to=https%3A%2F%2Fevil.example",
                None,
            ),
        )
        .await;
        assert_eq!(foreign.headers()["HX-Redirect"], "/edit");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let state = test_state();
        let cookie = login_cookie(&state).await;

        let response = send(&state, form("POST", "/logout", "", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(state.sessions.is_empty().await);

        let edit = send(&state, get_with_cookie("/edit", &cookie)).await;
        assert_eq!(edit.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_add_to_cart_and_view() {
        let state = test_state();
        let print_id = add_print(&state, "Blue Hour", 120.0).await;

        let response = send(
            &state,
            form("POST", "/cart/add", &format!("print_id={}", print_id), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cart = set_cookie(&response, "cart").unwrap();
        assert!(body_string(response).await.contains("Cart (1)"));

        let page = send(&state, get_with_cookie("/cart", &cart)).await;
        let body = body_string(page).await;
        assert!(body.contains("Blue Hour"));
        assert!(body.contains("Cart (1)"));
    }

    #[tokio::test]
    async fn test_corrupt_cart_cookie_is_empty_cart() {
        let response = send(&test_state(), get_with_cookie("/cart", "cart=%%%not-base64")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Your cart is empty."));
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = state_with(Database::in_memory().unwrap(), notifier.clone());
        let print_id = add_print(&state, "Blue Hour", 120.0).await;

        let added = send(
            &state,
            form("POST", "/cart/add", &format!("print_id={}", print_id), None),
        )
        .await;
        let cart = set_cookie(&added, "cart").unwrap();

        let response = send(
            &state,
            form("POST", "/cart/checkout", "email=buyer%40example.com", Some(&cart)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Thank you for your order!"));

        let orders = state.db.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].buyer_email, "buyer@example.com");
        assert_eq!(orders[0].status, OrderStatus::Placed);
        assert_eq!(orders[0].rows[0].title, "Blue Hour");
        assert_eq!(*notifier.sent.lock().unwrap(), vec![orders[0].order_id.clone()]);
    }

    #[tokio::test]
    async fn test_checkout_survives_notifier_failure() {
        let state = state_with(Database::in_memory().unwrap(), Arc::new(FailingNotifier));
        let print_id = add_print(&state, "Tidal", 80.0).await;

        let added = send(
            &state,
            form("POST", "/cart/add", &format!("print_id={}", print_id), None),
        )
        .await;
        let cart = set_cookie(&added, "cart").unwrap();

        let response = send(
            &state,
            form("POST", "/cart/checkout", "email=buyer%40example.com", Some(&cart)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("could not be delivered"));
        assert_eq!(state.db.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_rejected() {
        let response = send(
            &test_state(),
            form("POST", "/cart/checkout", "email=buyer%40example.com", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_unknown_art_field_is_bad_request() {
        let state = test_state();
        let cookie = login_cookie(&state).await;

        let response = send(
            &state,
            form("PATCH", "/edit/art/some-id/owner", "owner=me", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_art_with_json_and_form() {
        let state = test_state();
        let cookie = login_cookie(&state).await;
        let art = state
            .db
            .add_art(NewArt {
                title: "Nautilus".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let json = Request::patch(format!("/edit/art/{}", art.id))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &cookie)
            .body(Body::from(serde_json::json!({ "ordering": 7.5 }).to_string()))
            .unwrap();
        let response = send(&state, json).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Nautilus"));

        let replaced = send(
            &state,
            form(
                "PATCH",
                &format!("/edit/art/{}?replace=true", art.id),
                "title=Spiral&medium=",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(replaced.headers()["HX-Redirect"], "/edit");

        let stored = state.db.get_art(&art.id).await.unwrap().unwrap();
        assert_eq!(stored.ordering, 7.5);
        assert_eq!(stored.title, "Spiral");
    }

    #[tokio::test]
    async fn test_update_order_status() {
        let state = test_state();
        let cookie = login_cookie(&state).await;
        let print_id = add_print(&state, "Blue Hour", 120.0).await;

        let row = OrderRow::placed(
            "order-1",
            "buyer@example.com",
            &print_id,
            "Blue Hour",
            "print",
            1,
            120.0,
        );
        state.db.add_order_row(row).await.unwrap();

        let response = send(
            &state,
            form(
                "POST",
                "/orders/order-1/update_status",
                "order_status=SHIPPED",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains(r##"id="order-order-1""##));

        let order = state.db.get_order("order-1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.sent_at.is_some());

        let bogus = send(
            &state,
            form(
                "POST",
                "/orders/order-1/update_status",
                "order_status=LOST",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let state = test_state();

        let missing = send(&state, get("/api/db")).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = send(
            &state,
            Request::get("/api/db")
                .header(header::AUTHORIZATION, "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_api_downloads_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("database.db")).unwrap();
        let state = state_with(db, Arc::new(LogNotifier));

        let response = send(
            &state,
            Request::get("/api/db")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"database.db\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octet-stream");

        let on_disk = std::fs::read(dir.path().join("database.db")).unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), on_disk.as_slice());
    }

    #[tokio::test]
    async fn test_api_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.database.path = dir.path().join("absent.db").display().to_string();
        let state = AppState::new(
            config,
            Database::in_memory().unwrap(),
            Arc::new(SessionStore::new()),
            Arc::new(LogNotifier),
        );

        let response = send(
            &state,
            Request::get("/api/db-wal")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_cart_cookie_renders_clamped_badge() {
        let state = test_state();
        let json = r#"[{"print_id":"a","typ":"print","quantity":9223372036854775807},{"print_id":"b","typ":"print","quantity":-4}]"#;
        let cookie = format!("cart={}", STANDARD.encode(json));

        let page = send(&state, get_with_cookie("/", &cookie)).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_string(page).await.contains(&format!("Cart ({})", MAX_QUANTITY + 1)));

        let added = send(&state, form("POST", "/cart/add", "print_id=a", Some(&cookie))).await;
        assert_eq!(added.status(), StatusCode::OK);
        assert!(body_string(added).await.contains(&format!("Cart ({})", MAX_QUANTITY + 1)));
    }
}
