use serde::{Deserialize, Serialize};

use crate::models::AddressType;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NewAddressForm {
    pub kind: AddressType,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentForm {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry: String,
    pub cvv: String,
}
