use crate::{
    dto::cart::AddItemRequest,
    error::{AppError, AppResult},
    models::Totals,
    state::AppState,
    storage::CartStore,
};

pub fn add_item(
    state: &mut AppState,
    store: &impl CartStore,
    payload: AddItemRequest,
) -> AppResult<()> {
    let product_id = payload.product_id;
    state.ledger.add_item(payload)?;
    persist(state, store);
    tracing::debug!(product_id, "added to cart");
    Ok(())
}

/// Returns whether the quantity changed; out-of-range values are a no-op.
pub fn set_quantity(
    state: &mut AppState,
    store: &impl CartStore,
    product_id: i64,
    quantity: i32,
) -> bool {
    let changed = state.ledger.set_quantity(product_id, quantity);
    if changed {
        persist(state, store);
    }
    changed
}

pub fn remove_item(
    state: &mut AppState,
    store: &impl CartStore,
    product_id: i64,
) -> AppResult<()> {
    if !state.ledger.remove_item(product_id) {
        return Err(AppError::NotFound);
    }
    persist(state, store);
    tracing::debug!(product_id, "removed from cart");
    Ok(())
}

pub fn clear(state: &mut AppState, store: &impl CartStore) {
    state.ledger.clear();
    persist(state, store);
}

pub fn apply_promo(state: &mut AppState, code: &str) -> AppResult<()> {
    state.ledger.apply_promo(code, &state.config.pricing)
}

pub fn remove_promo(state: &mut AppState) {
    state.ledger.remove_promo();
}

pub fn totals(state: &AppState) -> Totals {
    state.ledger.totals(&state.config.pricing)
}

/// A failed write never fails the cart operation itself; the in-memory
/// ledger stays authoritative for the session.
pub(crate) fn persist(state: &AppState, store: &impl CartStore) {
    if let Err(err) = store.save(state.ledger.items()) {
        tracing::warn!(error = %err, "cart persistence failed");
    }
}
