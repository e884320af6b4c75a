//! Integration tests driving the call sites over real HTTP against a stub
//! marketplace backend.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use agromarket_client::actions::{CartPage, CartRow, CartSummary, ContactForm, FollowButton, Money, RowState};
use agromarket_client::effects::UiEvent;
use agromarket_client::{
    ActionError, ClientConfig, ClientError, CsrfToken, DispatchError, HttpTransport, MarketplaceClient,
    Mutation, MutationController, MutationOutcome, MutationRequest, NotificationKind, Notices, Payload,
    RecordingEffects, ServerState, TargetKey,
};

const TOKEN: &str = "test-token";
const STOCK: u32 = 10;

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Stub {
    /// item_id -> (unit price in cents, quantity)
    items: BTreeMap<String, (u64, u32)>,
    discount_percent: u64,
    messages: Vec<HashMap<String, String>>,
    requested_with: Vec<String>,
}

type Shared = Arc<Mutex<Stub>>;

fn cents(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

fn summary(stub: &Stub) -> Value {
    let subtotal: u64 = stub.items.values().map(|(p, q)| p * u64::from(*q)).sum();
    let total_items: u32 = stub.items.values().map(|(_, q)| q).sum();
    let discount = subtotal * stub.discount_percent / 100;
    let shipping = if subtotal > 0 { 599 } else { 0 };
    let tax = (subtotal - discount) * 8 / 100;
    json!({
        "subtotal": cents(subtotal),
        "shipping": cents(shipping),
        "tax": cents(tax),
        "discount": cents(discount),
        "total": cents(subtotal - discount + shipping + tax),
        "total_items": total_items,
    })
}

fn csrf_rejection(headers: &HeaderMap) -> Option<Response> {
    let ok = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TOKEN);
    (!ok).then(|| {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "message": "CSRF verification failed."})),
        )
            .into_response()
    })
}

async fn update_quantity(State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = csrf_rejection(&headers) {
        return rejection;
    }
    let mut stub = stub.lock().unwrap();
    if let Some(v) = headers.get("x-requested-with").and_then(|v| v.to_str().ok()) {
        stub.requested_with.push(v.to_string());
    }
    let item_id = body["item_id"].as_str().unwrap_or_default().to_string();
    let quantity = body["quantity"].as_u64().unwrap_or(0) as u32;
    if quantity > STOCK {
        return Json(json!({"success": false, "message": "Insufficient stock"})).into_response();
    }
    let Some(entry) = stub.items.get_mut(&item_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Cart item not found"})),
        )
            .into_response();
    };
    entry.1 = quantity;
    let item_total = entry.0 * u64::from(quantity);
    Json(json!({
        "success": true,
        "item_id": item_id,
        "item_total": cents(item_total),
        "cart_summary": summary(&stub),
    }))
    .into_response()
}

async fn remove_item(State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = csrf_rejection(&headers) {
        return rejection;
    }
    let mut stub = stub.lock().unwrap();
    let item_id = body["item_id"].as_str().unwrap_or_default();
    if stub.items.remove(item_id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Cart item not found"})),
        )
            .into_response();
    }
    Json(json!({"success": true, "cart_summary": summary(&stub)})).into_response()
}

async fn apply_coupon(State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = csrf_rejection(&headers) {
        return rejection;
    }
    let mut stub = stub.lock().unwrap();
    match body["coupon_code"].as_str() {
        Some("SAVE10") => {
            stub.discount_percent = 10;
            Json(json!({
                "success": true,
                "message": "Coupon SAVE10 applied!",
                "cart_summary": summary(&stub),
            }))
            .into_response()
        }
        _ => Json(json!({"success": false})).into_response(),
    }
}

async fn toggle_follow(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    if let Some(rejection) = csrf_rejection(&headers) {
        return rejection;
    }
    match form.get("user_id").map(String::as_str) {
        Some("13") => Json(json!({"success": false, "message": "You cannot follow yourself"})).into_response(),
        // Already unfollowed from another tab: the toggle lands on "not following".
        Some("21") => Json(json!({"success": true, "message": "You unfollowed orchard_co", "following": false}))
            .into_response(),
        Some(_) => Json(json!({"success": true, "message": "You are now following green_acres", "following": true}))
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "User ID is required"})),
        )
            .into_response(),
    }
}

async fn send_message(State(stub): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Some(rejection) = csrf_rejection(&headers) {
        return rejection;
    }
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    stub.lock().unwrap().messages.push(fields);
    Json(json!({"success": true, "message": "sent"})).into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html><h1>Server Error (500)</h1></html>").into_response()
}

async fn spawn_stub(items: &[(&str, u64, u32)]) -> (String, Shared) {
    let stub: Shared = Arc::new(Mutex::new(Stub {
        items: items
            .iter()
            .map(|(id, price, qty)| (id.to_string(), (*price, *qty)))
            .collect(),
        ..Stub::default()
    }));

    let app = Router::new()
        .route("/cart/update-quantity/", post(update_quantity))
        .route("/cart/remove-item/", post(remove_item))
        .route("/cart/apply-coupon/", post(apply_coupon))
        .route("/users/toggle-follow/", post(toggle_follow))
        .route("/users/send-message/", post(send_message))
        .route("/broken/", post(broken))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), stub)
}

/// A base URL nothing is listening on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn config(base_url: &str, token: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        csrf_token: Some(CsrfToken::new(token)),
        reload_delay: Duration::from_millis(1000),
        ..ClientConfig::default()
    }
}

fn client<'a>(base_url: &str, effects: &'a RecordingEffects) -> MarketplaceClient<HttpTransport, &'a RecordingEffects> {
    MarketplaceClient::from_config(&config(base_url, TOKEN), effects).unwrap()
}

fn initial_summary() -> CartSummary {
    serde_json::from_value(json!({
        "subtotal": "10.00", "shipping": "5.99", "tax": "0.80",
        "discount": "0.00", "total": "16.79", "total_items": 2
    }))
    .unwrap()
}

fn cart_page() -> RefCell<CartPage> {
    RefCell::new(CartPage::new(
        vec![CartRow::new("1", 2, &Money::new("10.00"))],
        &initial_summary(),
    ))
}

fn notification(message: &str, kind: NotificationKind) -> Vec<(String, NotificationKind)> {
    vec![(message.to_string(), kind)]
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quantity_update_reconciles_with_server_totals() {
    let (base, stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();

    let outcome = client.update_quantity(&page, "1", 5).await.unwrap();

    match outcome {
        MutationOutcome::Success(update) => {
            assert_eq!(update.item_total.as_str(), "25.00");
            assert_eq!(update.cart_summary.total_items, 5);
        }
        other => panic!("expected success, got {other:?}"),
    }
    let page = page.borrow();
    let row = page.row("1").unwrap();
    assert_eq!(row.quantity, 5);
    assert_eq!(row.item_total, "$25.00");
    assert!(row.input_enabled);
    assert_eq!(page.header_count, "5");
    assert_eq!(page.summary.subtotal, "$25.00");
    assert_eq!(page.summary.item_count, "5");
    assert_eq!(
        effects.notifications(),
        notification("Cart updated successfully!", NotificationKind::Success)
    );
    assert!(!effects.loading_visible());
    assert_eq!(stub.lock().unwrap().requested_with, vec!["XMLHttpRequest".to_string()]);
}

#[tokio::test]
async fn quantity_update_rejection_restores_page() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();
    let before = page.borrow().clone();

    let outcome = client.update_quantity(&page, "1", 50).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("Insufficient stock".into()));
    assert_eq!(*page.borrow(), before);
    assert_eq!(page.borrow().row("1").unwrap().quantity, 2);
    assert_eq!(
        effects.notifications(),
        notification("Insufficient stock", NotificationKind::Error)
    );
    assert!(!effects.loading_visible());
}

#[tokio::test]
async fn quantity_update_uses_error_field_of_failed_response() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();

    let outcome = client.update_quantity(&page, "1", 3).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("Cart item not found".into()));
    assert_eq!(page.borrow().row("1").unwrap().quantity, 2);
}

#[tokio::test]
async fn zero_quantity_asks_for_removal_confirmation() {
    let effects = RecordingEffects::new();
    let client = client(&dead_url().await, &effects);
    let page = cart_page();

    let err = client.update_quantity(&page, "1", 0).await.unwrap_err();

    assert_eq!(err, ActionError::ConfirmRemoval { item_id: "1".into() });
    assert_eq!(page.borrow().pending_removal.as_deref(), Some("1"));
    assert!(effects.events().is_empty());

    client.cancel_removal(&page);
    assert!(page.borrow().pending_removal.is_none());
    assert!(client.confirm_removal(&page).await.is_none());
}

#[tokio::test]
async fn unknown_item_is_reported() {
    let effects = RecordingEffects::new();
    let client = client(&dead_url().await, &effects);
    let page = cart_page();

    let err = client.update_quantity(&page, "404", 3).await.unwrap_err();
    assert_eq!(err, ActionError::UnknownTarget("cart-item:404".into()));
    assert!(effects.events().is_empty());
}

#[tokio::test]
async fn removing_last_item_fades_row_and_schedules_reload() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();

    assert!(client.update_quantity(&page, "1", 0).await.is_err());
    let outcome = client.confirm_removal(&page).await.unwrap().unwrap();

    assert!(outcome.is_success());
    let page = page.borrow();
    assert_eq!(page.row("1").unwrap().state, RowState::Removed);
    assert_eq!(page.header_count, "0");
    assert_eq!(page.reload_after, Some(Duration::from_millis(1000)));
    assert!(page.pending_removal.is_none());
    assert_eq!(
        effects.notifications(),
        notification("Item removed from cart", NotificationKind::Success)
    );
}

#[tokio::test]
async fn removing_one_of_many_does_not_reload() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2), ("2", 300, 1)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = RefCell::new(CartPage::new(
        vec![
            CartRow::new("1", 2, &Money::new("10.00")),
            CartRow::new("2", 1, &Money::new("3.00")),
        ],
        &initial_summary(),
    ));

    client.remove_item(&page, "2").await.unwrap();

    let page = page.borrow();
    assert_eq!(page.row("2").unwrap().state, RowState::Removed);
    assert_eq!(page.row("1").unwrap().state, RowState::Visible);
    assert_eq!(page.header_count, "2");
    assert_eq!(page.reload_after, None);
}

#[tokio::test]
async fn remove_rejection_restores_row() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();
    let before = page.borrow().clone();

    let outcome = client.remove_item(&page, "1").await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("Cart item not found".into()));
    assert_eq!(*page.borrow(), before);
    assert_eq!(page.borrow().row("1").unwrap().state, RowState::Visible);
    assert_eq!(
        effects.notifications(),
        notification("Cart item not found", NotificationKind::Error)
    );
    assert!(!effects.loading_visible());
}

#[tokio::test]
async fn confirming_removal_of_busy_item_keeps_it_pending() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();
    page.borrow_mut().pending_removal = Some("1".into());

    let (update, removal) = tokio::join!(
        client.update_quantity(&page, "1", 5),
        client.confirm_removal(&page),
    );

    assert!(update.unwrap().is_success());
    assert_eq!(
        removal.unwrap().unwrap_err(),
        ActionError::Dispatch(DispatchError::TargetBusy {
            target: TargetKey::new("cart-item:1")
        })
    );
    let page = page.borrow();
    assert_eq!(page.pending_removal.as_deref(), Some("1"));
    assert_eq!(page.row("1").unwrap().state, RowState::Visible);
}

#[tokio::test]
async fn coupon_applied_updates_summary_and_clears_input() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();
    page.borrow_mut().coupon_input = "  SAVE10 ".into();

    let outcome = client.apply_coupon(&page).await.unwrap();

    assert!(outcome.is_success());
    let page = page.borrow();
    assert_eq!(page.summary.discount, "-$1.00");
    assert!(page.coupon_input.is_empty());
    assert!(page.coupon_enabled);
    assert_eq!(
        effects.notifications(),
        notification("Coupon SAVE10 applied!", NotificationKind::Success)
    );
}

#[tokio::test]
async fn coupon_rejected_without_message_uses_fallback() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();
    page.borrow_mut().coupon_input = "BOGUS".into();
    let before = page.borrow().clone();

    let outcome = client.apply_coupon(&page).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("Invalid coupon code".into()));
    assert_eq!(*page.borrow(), before);
    assert_eq!(
        effects.notifications(),
        notification("Invalid coupon code", NotificationKind::Error)
    );
}

#[tokio::test]
async fn empty_coupon_is_not_sent() {
    let effects = RecordingEffects::new();
    let client = client(&dead_url().await, &effects);
    let page = cart_page();
    page.borrow_mut().coupon_input = "   ".into();

    let err = client.apply_coupon(&page).await.unwrap_err();

    assert_eq!(err, ActionError::Validation("Please enter a coupon code".into()));
    assert_eq!(
        effects.events(),
        vec![UiEvent::Notification {
            message: "Please enter a coupon code".into(),
            kind: NotificationKind::Error
        }]
    );
}

#[tokio::test]
async fn overlapping_updates_on_one_item_refuse_the_second() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let page = cart_page();

    let (first, second) = tokio::join!(
        client.update_quantity(&page, "1", 5),
        client.update_quantity(&page, "1", 7),
    );

    assert!(first.unwrap().is_success());
    assert_eq!(
        second.unwrap_err(),
        ActionError::Dispatch(DispatchError::TargetBusy {
            target: TargetKey::new("cart-item:1")
        })
    );
    assert_eq!(page.borrow().row("1").unwrap().quantity, 5);
    assert_eq!(effects.notifications().len(), 1);
    assert!(client.controller().in_flight().is_empty());
}

#[tokio::test]
async fn wrong_csrf_token_is_a_rejection() {
    let (base, _stub) = spawn_stub(&[("1", 500, 2)]).await;
    let effects = RecordingEffects::new();
    let client = MarketplaceClient::from_config(&config(&base, "stale"), &effects).unwrap();
    let page = cart_page();

    let outcome = client.update_quantity(&page, "1", 3).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("CSRF verification failed.".into()));
    assert_eq!(page.borrow().row("1").unwrap().quantity, 2);
}

// ---------------------------------------------------------------------------
// Follow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follow_toggle_confirmed() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let button = RefCell::new(FollowButton::new("7", false));

    let outcome = client.toggle_follow(&button).await.unwrap();

    match outcome {
        MutationOutcome::Success(state) => assert_eq!(state.following, Some(true)),
        other => panic!("expected success, got {other:?}"),
    }
    assert!(button.borrow().following);
    assert_eq!(button.borrow().label, "Following");
    assert_eq!(
        effects.notifications(),
        notification("You are now following green_acres", NotificationKind::Success)
    );
}

#[tokio::test]
async fn follow_toggle_takes_relationship_reported_by_server() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let button = RefCell::new(FollowButton::new("21", false));

    let outcome = client.toggle_follow(&button).await.unwrap();

    assert!(outcome.is_success());
    assert!(!button.borrow().following);
    assert_eq!(button.borrow().label, "Follow");
    assert_eq!(
        effects.notifications(),
        notification("You unfollowed orchard_co", NotificationKind::Success)
    );
}

#[tokio::test]
async fn follow_toggle_rejected_reverts() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let button = RefCell::new(FollowButton::new("13", true));
    let before = button.borrow().clone();

    let outcome = client.toggle_follow(&button).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Rejected("You cannot follow yourself".into()));
    assert_eq!(*button.borrow(), before);
    assert_eq!(
        effects.notifications(),
        notification("You cannot follow yourself", NotificationKind::Error)
    );
}

#[tokio::test]
async fn follow_toggle_network_failure_reverts_to_follow() {
    let effects = RecordingEffects::new();
    let client = client(&dead_url().await, &effects);
    let button = RefCell::new(FollowButton::new("7", false));

    let outcome = client.toggle_follow(&button).await.unwrap();

    assert!(matches!(outcome, MutationOutcome::NetworkError(_)));
    assert!(!button.borrow().following);
    assert_eq!(button.borrow().label, "Follow");
    assert_eq!(
        effects.notifications(),
        notification("An error occurred. Please try again.", NotificationKind::Error)
    );
    assert!(!effects.loading_visible());
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[tokio::test]
async fn contact_message_sent_as_multipart() {
    let (base, stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let form = RefCell::new(ContactForm::new("7"));
    {
        let mut form = form.borrow_mut();
        form.open();
        form.set("subject", "Bulk order");
        form.set("message", "Can you deliver 50kg of tomatoes?");
    }

    let outcome = client.send_message(&form).await.unwrap();

    assert!(outcome.is_success());
    let form = form.borrow();
    assert!(!form.modal_open);
    assert_eq!(form.value("subject"), Some(""));
    assert!(form.submit_enabled);
    assert_eq!(form.submit_label, "Send Message");
    assert_eq!(
        effects.notifications(),
        notification("Message sent successfully!", NotificationKind::Success)
    );

    let stub = stub.lock().unwrap();
    assert_eq!(stub.messages.len(), 1);
    assert_eq!(stub.messages[0]["recipient_id"], "7");
    assert_eq!(stub.messages[0]["subject"], "Bulk order");
}

#[tokio::test]
async fn invalid_contact_form_is_not_sent() {
    let (base, stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let client = client(&base, &effects);
    let form = RefCell::new(ContactForm::new("7"));
    form.borrow_mut().set("subject", "Hello");

    let err = client.send_message(&form).await.unwrap_err();

    assert_eq!(err, ActionError::Validation("This field is required.".into()));
    assert_eq!(
        effects.notifications(),
        notification("Please correct the errors in the form.", NotificationKind::Error)
    );
    assert!(stub.lock().unwrap().messages.is_empty());
}

#[tokio::test]
async fn contact_network_failure_keeps_typed_message() {
    let effects = RecordingEffects::new();
    let client = client(&dead_url().await, &effects);
    let form = RefCell::new(ContactForm::new("7"));
    {
        let mut form = form.borrow_mut();
        form.open();
        form.set("subject", "Hi");
        form.set("message", "Still there?");
    }
    let before = form.borrow().clone();

    let outcome = client.send_message(&form).await.unwrap();

    assert!(matches!(outcome, MutationOutcome::NetworkError(_)));
    assert_eq!(*form.borrow(), before);
}

// ---------------------------------------------------------------------------
// Controller over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn html_error_page_rolls_back_with_generic_message() {
    let (base, _stub) = spawn_stub(&[]).await;
    let effects = RecordingEffects::new();
    let transport = HttpTransport::new(&config(&base, TOKEN)).unwrap();
    let controller = MutationController::new(transport, &effects);

    let mut mutation = Mutation::new(
        MutationRequest::post("/broken/", Payload::json(json!({}))).with_csrf_token(&CsrfToken::new(TOKEN)),
        TargetKey::new("broken"),
        Notices::fixed("done", "failed"),
    );
    let rolled_back = RefCell::new(None);
    let outcome = controller
        .perform::<ServerState, _, _, _>(
            &mut mutation,
            || {},
            |_| {},
            |reason| *rolled_back.borrow_mut() = Some(reason.to_string()),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, MutationOutcome::NetworkError(_)));
    assert_eq!(rolled_back.borrow().as_deref(), Some("An error occurred. Please try again."));
    assert!(!effects.loading_visible());
}

#[test]
fn client_without_token_fails_at_setup() {
    let effects = RecordingEffects::new();
    let config = ClientConfig {
        csrf_token: None,
        ..ClientConfig::default()
    };
    assert!(matches!(
        MarketplaceClient::from_config(&config, &effects),
        Err(ClientError::MissingCsrfToken)
    ));
}
