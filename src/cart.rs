use crate::{
    config::PricingConfig,
    dto::cart::AddItemRequest,
    error::{AppError, AppResult},
    models::{CartLineItem, PromoCode, Totals},
};

pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 99;

/// The authoritative in-session set of line items plus the active promo.
/// All transitions are pure; persistence lives in the service layer.
#[derive(Debug, Default, Clone)]
pub struct CartLedger {
    items: Vec<CartLineItem>,
    promo: Option<PromoCode>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Self { items, promo: None }
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_promo(&self) -> Option<&PromoCode> {
        self.promo.as_ref()
    }

    /// Adding a product already in the cart merges by incrementing its
    /// quantity; there is never more than one line item per product id.
    pub fn add_item(&mut self, req: AddItemRequest) -> AppResult<()> {
        if req.quantity < MIN_QUANTITY {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        if req.unit_price < 0 {
            return Err(AppError::BadRequest(
                "unit price must not be negative".to_string(),
            ));
        }

        match self.items.iter_mut().find(|i| i.product_id == req.product_id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(req.quantity).min(MAX_QUANTITY);
            }
            None => self.items.push(CartLineItem {
                product_id: req.product_id,
                name: req.name,
                unit_price: req.unit_price,
                quantity: req.quantity.min(MAX_QUANTITY),
                image_ref: req.image_ref,
            }),
        }
        Ok(())
    }

    /// Out-of-range quantities and unknown product ids leave the cart
    /// untouched; returns whether anything changed.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i32) -> bool {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return false;
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.promo = None;
    }

    /// At most one promo is active; a successful lookup replaces the current
    /// one, an unknown code leaves it untouched.
    pub fn apply_promo(&mut self, code: &str, pricing: &PricingConfig) -> AppResult<()> {
        let normalized = code.trim().to_uppercase();
        let Some(&rate_bps) = pricing.promo_codes.get(&normalized) else {
            return Err(AppError::UnknownPromo(normalized));
        };
        self.promo = Some(PromoCode {
            code: normalized,
            rate_bps,
        });
        Ok(())
    }

    pub fn remove_promo(&mut self) {
        self.promo = None;
    }

    /// Discount applies to the subtotal before tax; tax is computed on the
    /// post-discount amount. An empty cart owes nothing, including shipping.
    pub fn totals(&self, pricing: &PricingConfig) -> Totals {
        if self.items.is_empty() {
            return Totals {
                subtotal: 0,
                shipping_fee: 0,
                discount: 0,
                tax: 0,
                grand_total: 0,
            };
        }

        let subtotal: i64 = self
            .items
            .iter()
            .map(|i| i.unit_price * i64::from(i.quantity))
            .sum();
        let shipping_fee = if subtotal > pricing.free_shipping_over {
            0
        } else {
            pricing.shipping_fee
        };
        let discount = match &self.promo {
            Some(promo) => apply_rate(subtotal, promo.rate_bps),
            None => 0,
        };
        let tax = apply_rate(subtotal - discount, pricing.tax_rate_bps);

        Totals {
            subtotal,
            shipping_fee,
            discount,
            tax,
            grand_total: subtotal + shipping_fee - discount + tax,
        }
    }
}

/// Applies a basis-point rate, rounding half away from zero to the cent.
fn apply_rate(amount: i64, bps: i64) -> i64 {
    (amount * bps + 5_000) / 10_000
}
