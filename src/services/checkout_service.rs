use chrono::Utc;
use tokio::time::timeout;
use uuid::Uuid;

use crate::{
    checkout::{CheckoutDraft, CheckoutStep},
    error::{AppError, AppResult},
    gateway::{OrderGateway, OrderSubmission},
    models::{Address, Order},
    services::cart_service,
    state::AppState,
    storage::CartStore,
    validate,
};

/// Seeds the saved-address options for the shipping step.
pub async fn load_saved_addresses(
    state: &mut AppState,
    gateway: &impl OrderGateway,
) -> AppResult<()> {
    let fetched = gateway.fetch_addresses().await?;
    for address in fetched {
        state.push_address(address);
    }
    Ok(())
}

pub fn select_address(state: &AppState, draft: &mut CheckoutDraft, id: Uuid) -> AppResult<()> {
    if state.address(id).is_none() {
        return Err(AppError::NotFound);
    }
    draft.select_address(id);
    Ok(())
}

/// Validates and saves the in-progress address sub-form. On success the new
/// address is appended to the book and selected, and the sub-form collapses;
/// the wizard step does not move. Validation failure returns `Ok(None)` with
/// the field errors recorded on the draft.
pub fn submit_new_address(
    state: &mut AppState,
    draft: &mut CheckoutDraft,
) -> AppResult<Option<Uuid>> {
    let errors = match draft.new_address_form() {
        Some(form) => validate::validate_new_address(form),
        None => {
            return Err(AppError::BadRequest("no address form open".to_string()));
        }
    };
    if !errors.is_empty() {
        draft.record_errors(errors);
        return Ok(None);
    }
    let Some(form) = draft.take_new_address() else {
        return Err(AppError::BadRequest("no address form open".to_string()));
    };

    let address = Address {
        id: Uuid::new_v4(),
        kind: form.kind,
        label: form.label,
        line1: form.line1,
        line2: form.line2,
        city: form.city,
        state: form.state,
        zip_code: form.zip_code,
        is_default: false,
    };
    let id = state.push_address(address);
    draft.select_address(id);
    tracing::debug!(address_id = %id, "address saved");
    Ok(Some(id))
}

/// The Payment -> Completed transition. Payment validation failure returns
/// `Ok(None)` with field errors recorded. Gateway failure or timeout is an
/// error that leaves the draft and the ledger untouched, so the caller can
/// retry without re-entering anything. On success the order is snapshotted,
/// the cart is cleared and persisted, and the draft completes.
pub async fn place_order(
    state: &mut AppState,
    store: &impl CartStore,
    draft: &mut CheckoutDraft,
    gateway: &impl OrderGateway,
) -> AppResult<Option<Order>> {
    if draft.step() != CheckoutStep::Payment {
        return Err(AppError::BadRequest(
            "checkout is not at the payment step".to_string(),
        ));
    }
    if state.ledger.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let errors = validate::validate_payment(&draft.payment);
    if !errors.is_empty() {
        draft.record_errors(errors);
        return Ok(None);
    }

    let address = draft
        .selected_address_id()
        .and_then(|id| state.address(id))
        .cloned()
        .ok_or_else(|| AppError::BadRequest("no shipping address selected".to_string()))?;

    let totals = state.ledger.totals(&state.config.pricing);
    let payment_ref = mask_card(&draft.payment.card_number);
    let submission = OrderSubmission {
        items: state.ledger.items().to_vec(),
        totals,
        shipping_address: address.clone(),
        payment_ref: payment_ref.clone(),
    };

    match timeout(state.config.submit_timeout, gateway.submit_order(&submission)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(AppError::Submission(err.to_string())),
        Err(_) => return Err(AppError::SubmissionTimeout),
    }

    let order = Order {
        order_id: generate_order_id(),
        items: submission.items,
        totals,
        shipping_address: address,
        payment_ref,
        placed_at: Utc::now(),
    };

    state.ledger.clear();
    cart_service::persist(state, store);
    draft.complete();

    tracing::info!(
        order_id = %order.order_id,
        grand_total = order.totals.grand_total,
        "order placed"
    );
    Ok(Some(order))
}

/// `ORD-` followed by six random digits, drawn from v4 uuid entropy.
fn generate_order_id() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let n = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000;
    format!("ORD-{n:06}")
}

/// Only the last four digits leave the checkout flow.
fn mask_card(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let last4 = &digits[digits.len().saturating_sub(4)..];
    format!("**** **** **** {last4}")
}
