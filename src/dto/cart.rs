use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    pub name: String,
    /// Cents.
    pub unit_price: i64,
    pub quantity: i32,
    pub image_ref: String,
}
