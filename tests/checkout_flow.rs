use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use storefront_checkout::{
    checkout::{CheckoutDraft, CheckoutStep, Field},
    config::{AppConfig, PricingConfig},
    dto::cart::AddItemRequest,
    error::AppError,
    gateway::{OrderGateway, OrderSubmission},
    models::{Address, AddressType},
    services::{cart_service, checkout_service},
    state::AppState,
    storage::{CartStore, MemoryStore},
    validate,
};
use uuid::Uuid;

struct OkGateway;

impl OrderGateway for OkGateway {
    async fn submit_order(&self, _submission: &OrderSubmission) -> anyhow::Result<()> {
        Ok(())
    }

    async fn fetch_addresses(&self) -> anyhow::Result<Vec<Address>> {
        Ok(vec![Address {
            id: Uuid::new_v4(),
            kind: AddressType::Work,
            label: "Office".into(),
            line1: "200 Commerce Way".into(),
            line2: Some("Suite 4".into()),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62702".into(),
            is_default: false,
        }])
    }
}

/// Fails the first `n` submissions, then accepts.
struct FlakyGateway {
    failures_left: AtomicU32,
}

impl FlakyGateway {
    fn failing(n: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(n),
        }
    }
}

impl OrderGateway for FlakyGateway {
    async fn submit_order(&self, _submission: &OrderSubmission) -> anyhow::Result<()> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!("card declined");
        }
        Ok(())
    }

    async fn fetch_addresses(&self) -> anyhow::Result<Vec<Address>> {
        Ok(Vec::new())
    }
}

struct SlowGateway;

impl OrderGateway for SlowGateway {
    async fn submit_order(&self, _submission: &OrderSubmission) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }

    async fn fetch_addresses(&self) -> anyhow::Result<Vec<Address>> {
        Ok(Vec::new())
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        cart_path: "unused.json".into(),
        submit_timeout: Duration::from_secs(1),
        pricing: PricingConfig::default(),
    }
}

fn seeded_state(store: &impl CartStore) -> AppState {
    let mut state = AppState::new(test_config(), store);
    cart_service::add_item(
        &mut state,
        store,
        AddItemRequest {
            product_id: 1,
            name: "Axum Hoodie".into(),
            unit_price: 5_500,
            quantity: 1,
            image_ref: "hoodie.png".into(),
        },
    )
    .expect("seed cart");
    state
}

fn fill_contact(draft: &mut CheckoutDraft) {
    draft.set_field(Field::Email, "user@example.com");
    draft.set_field(Field::FullName, "Sample User");
    draft.set_field(Field::Phone, "555-0100");
}

fn fill_new_address(draft: &mut CheckoutDraft) {
    draft.open_new_address();
    draft.set_field(Field::AddressLabel, "Home");
    draft.set_field(Field::AddressLine1, "1 Main St");
    draft.set_field(Field::AddressCity, "Springfield");
    draft.set_field(Field::AddressState, "IL");
    draft.set_field(Field::AddressZip, "62701");
}

fn fill_payment(draft: &mut CheckoutDraft) {
    draft.set_field(Field::CardNumber, "4111 1111 1111 1111");
    draft.set_field(Field::CardholderName, "Sample User");
    draft.set_field(Field::Expiry, "12/27");
    draft.set_field(Field::Cvv, "123");
}

fn walk_to_payment(state: &mut AppState, draft: &mut CheckoutDraft) {
    fill_contact(draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);
    fill_new_address(draft);
    checkout_service::submit_new_address(state, draft)
        .expect("submit address")
        .expect("address accepted");
    assert_eq!(draft.advance(), CheckoutStep::Payment);
}

#[test]
fn contact_gate_blocks_on_missing_email() {
    let mut draft = CheckoutDraft::new();
    draft.set_field(Field::FullName, "Sample User");
    draft.set_field(Field::Phone, "555-0100");

    assert_eq!(draft.advance(), CheckoutStep::Contact);
    assert!(draft.field_errors().contains_key("email"));
}

#[test]
fn contact_gate_rejects_malformed_email() {
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    draft.set_field(Field::Email, "not-an-email");

    assert_eq!(draft.advance(), CheckoutStep::Contact);
    assert_eq!(
        draft.field_errors().get("email").map(String::as_str),
        Some("Enter a valid email address")
    );
}

#[test]
fn retyping_a_field_clears_only_its_own_error() {
    let mut draft = CheckoutDraft::new();
    assert_eq!(draft.advance(), CheckoutStep::Contact);
    assert_eq!(draft.field_errors().len(), 3);

    draft.set_field(Field::Email, "user@example.com");

    assert!(!draft.field_errors().contains_key("email"));
    assert!(draft.field_errors().contains_key("full_name"));
    assert!(draft.field_errors().contains_key("phone"));
}

#[test]
fn back_transitions_are_unconditional() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);

    assert_eq!(draft.back(), CheckoutStep::Shipping);
    assert_eq!(draft.back(), CheckoutStep::Contact);
    assert_eq!(draft.back(), CheckoutStep::Contact);
}

#[test]
fn shipping_gate_requires_a_selected_address() {
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);

    assert_eq!(draft.advance(), CheckoutStep::Shipping);
    assert!(draft.field_errors().contains_key("address"));
}

#[test]
fn open_address_form_blocks_advance_until_submitted() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);

    // Fully filled but never submitted: the wizard must not move.
    fill_new_address(&mut draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);
    assert!(draft.field_errors().contains_key("address"));

    checkout_service::submit_new_address(&mut state, &mut draft)
        .expect("submit address")
        .expect("address accepted");
    assert_eq!(draft.advance(), CheckoutStep::Payment);
}

#[test]
fn submitting_the_address_form_selects_and_collapses_it() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    draft.advance();
    fill_new_address(&mut draft);

    let id = checkout_service::submit_new_address(&mut state, &mut draft)
        .expect("submit address")
        .expect("address accepted");

    assert_eq!(draft.selected_address_id(), Some(id));
    assert!(draft.new_address_form().is_none());
    assert_eq!(draft.step(), CheckoutStep::Shipping);

    let saved = state.address(id).expect("saved address");
    assert!(saved.is_default, "first address becomes the default");
}

#[test]
fn typing_an_address_field_opens_the_form_and_drops_the_selection() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let id = state.push_address(Address {
        id: Uuid::new_v4(),
        kind: AddressType::Home,
        label: "Home".into(),
        line1: "1 Main St".into(),
        line2: None,
        city: "Springfield".into(),
        state: "IL".into(),
        zip_code: "62701".into(),
        is_default: false,
    });
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);
    checkout_service::select_address(&state, &mut draft, id).expect("select saved address");
    assert_eq!(draft.selected_address_id(), Some(id));

    // No open_new_address(): the first keystroke switches paths by itself.
    draft.set_field(Field::AddressLine1, "9 Elm St");

    assert_eq!(draft.selected_address_id(), None);
    let form = draft.new_address_form().expect("sub-form opened");
    assert_eq!(form.line1, "9 Elm St");
}

#[test]
fn incomplete_address_form_reports_fields_and_stays() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    draft.advance();
    draft.open_new_address();
    draft.set_field(Field::AddressLabel, "Home");

    let outcome = checkout_service::submit_new_address(&mut state, &mut draft)
        .expect("submit address");

    assert!(outcome.is_none());
    assert!(draft.field_errors().contains_key("line1"));
    assert!(draft.field_errors().contains_key("city"));
    assert!(state.addresses.is_empty());
}

#[test]
fn selecting_an_unknown_address_is_not_found() {
    let store = MemoryStore::new();
    let state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();

    let err = checkout_service::select_address(&state, &mut draft, Uuid::new_v4())
        .expect_err("unknown address id");
    assert!(matches!(err, AppError::NotFound));
}

#[test]
fn card_number_validation_ignores_spaces_but_not_dashes() {
    let mut draft = CheckoutDraft::new();
    fill_payment(&mut draft);
    assert!(validate::validate_payment(&draft.payment).is_empty());

    draft.set_field(Field::CardNumber, "4111-1111-1111");
    let errors = validate::validate_payment(&draft.payment);
    assert_eq!(
        errors.get("card_number").map(String::as_str),
        Some("Card number must be 16 digits")
    );
}

#[tokio::test]
async fn invalid_payment_holds_the_step_without_an_error_result() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);
    fill_payment(&mut draft);
    draft.set_field(Field::Expiry, "1227");

    let outcome = checkout_service::place_order(&mut state, &store, &mut draft, &OkGateway)
        .await
        .expect("validation is not an error");

    assert!(outcome.is_none());
    assert_eq!(draft.step(), CheckoutStep::Payment);
    assert!(draft.field_errors().contains_key("expiry"));
    assert!(!state.ledger.is_empty());
}

#[tokio::test]
async fn successful_order_clears_the_cart_and_issues_an_id() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);
    fill_payment(&mut draft);

    let order = checkout_service::place_order(&mut state, &store, &mut draft, &OkGateway)
        .await
        .expect("place order")
        .expect("order confirmed");

    assert!(order.order_id.starts_with("ORD-"));
    assert_eq!(order.order_id.len(), 10);
    assert!(order.order_id[4..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.totals.subtotal, 5_500);
    assert_eq!(order.payment_ref, "**** **** **** 1111");

    assert_eq!(draft.step(), CheckoutStep::Completed);
    assert!(state.ledger.is_empty());
    assert!(store.load().is_empty(), "cleared cart is persisted");
}

#[tokio::test]
async fn failed_submission_preserves_the_draft_for_retry() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);
    fill_payment(&mut draft);

    let gateway = FlakyGateway::failing(1);
    let err = checkout_service::place_order(&mut state, &store, &mut draft, &gateway)
        .await
        .expect_err("first attempt fails");
    assert!(matches!(err, AppError::Submission(_)));
    assert_eq!(draft.step(), CheckoutStep::Payment);
    assert_eq!(draft.payment.card_number, "4111 1111 1111 1111");
    assert!(!state.ledger.is_empty());

    // Same draft, same data: the retry goes through.
    let order = checkout_service::place_order(&mut state, &store, &mut draft, &gateway)
        .await
        .expect("retry")
        .expect("order confirmed");
    assert_eq!(draft.step(), CheckoutStep::Completed);
    assert!(order.order_id.starts_with("ORD-"));
}

#[tokio::test]
async fn slow_submission_times_out() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    state.config.submit_timeout = Duration::from_millis(50);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);
    fill_payment(&mut draft);

    let err = checkout_service::place_order(&mut state, &store, &mut draft, &SlowGateway)
        .await
        .expect_err("gateway hangs past the deadline");
    assert!(matches!(err, AppError::SubmissionTimeout));
    assert_eq!(draft.step(), CheckoutStep::Payment);
}

#[tokio::test]
async fn placing_an_order_off_step_is_rejected() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    let mut draft = CheckoutDraft::new();

    let err = checkout_service::place_order(&mut state, &store, &mut draft, &OkGateway)
        .await
        .expect_err("still on the contact step");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn an_empty_cart_cannot_check_out() {
    let store = MemoryStore::new();
    let mut state = AppState::new(test_config(), &store);
    let mut draft = CheckoutDraft::new();
    walk_to_payment(&mut state, &mut draft);
    fill_payment(&mut draft);

    let err = checkout_service::place_order(&mut state, &store, &mut draft, &OkGateway)
        .await
        .expect_err("nothing to order");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn saved_addresses_seed_the_shipping_step() {
    let store = MemoryStore::new();
    let mut state = seeded_state(&store);
    checkout_service::load_saved_addresses(&mut state, &OkGateway)
        .await
        .expect("fetch addresses");
    assert_eq!(state.addresses.len(), 1);
    assert!(state.addresses[0].is_default, "first entry promoted to default");

    let id = state.addresses[0].id;
    let mut draft = CheckoutDraft::new();
    fill_contact(&mut draft);
    assert_eq!(draft.advance(), CheckoutStep::Shipping);
    checkout_service::select_address(&state, &mut draft, id).expect("select saved address");
    assert_eq!(draft.advance(), CheckoutStep::Payment);
}
