use std::collections::BTreeMap;

use crate::dto::checkout::{ContactForm, NewAddressForm, PaymentForm};

/// Field name -> human-readable message, rendered inline by the caller.
pub type FieldErrors = BTreeMap<String, String>;

pub fn validate_contact(form: &ContactForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if require(&mut errors, "email", &form.email, "Email is required")
        && !is_valid_email(&form.email)
    {
        errors.insert("email".into(), "Enter a valid email address".into());
    }
    require(&mut errors, "full_name", &form.full_name, "Full name is required");
    require(&mut errors, "phone", &form.phone, "Phone number is required");
    errors
}

pub fn validate_new_address(form: &NewAddressForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "label", &form.label, "Address label is required");
    require(&mut errors, "line1", &form.line1, "Street address is required");
    require(&mut errors, "city", &form.city, "City is required");
    require(&mut errors, "state", &form.state, "State is required");
    require(&mut errors, "zip_code", &form.zip_code, "ZIP code is required");
    errors
}

pub fn validate_payment(form: &PaymentForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if require(
        &mut errors,
        "card_number",
        &form.card_number,
        "Card number is required",
    ) && !is_valid_card_number(&form.card_number)
    {
        errors.insert("card_number".into(), "Card number must be 16 digits".into());
    }
    require(
        &mut errors,
        "cardholder_name",
        &form.cardholder_name,
        "Cardholder name is required",
    );
    if require(&mut errors, "expiry", &form.expiry, "Expiry date is required")
        && !is_valid_expiry(&form.expiry)
    {
        errors.insert("expiry".into(), "Expiry must be in MM/YY format".into());
    }
    if require(&mut errors, "cvv", &form.cvv, "CVV is required") && !is_valid_cvv(&form.cvv) {
        errors.insert("cvv".into(), "CVV must be 3 or 4 digits".into());
    }
    errors
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
        false
    } else {
        true
    }
}

/// Accepts `local@domain.tld` shapes only.
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Whitespace is ignored; any other separator fails the all-digits check.
fn is_valid_card_number(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 16 && digits.chars().all(|c| c.is_ascii_digit())
}

/// Pattern check only (`MM/YY`); no month or year range validation.
fn is_valid_expiry(raw: &str) -> bool {
    let b = raw.trim().as_bytes();
    b.len() == 5
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b'/'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
}

fn is_valid_cvv(raw: &str) -> bool {
    let v = raw.trim();
    (3..=4).contains(&v.len()) && v.chars().all(|c| c.is_ascii_digit())
}
