use uuid::Uuid;

use crate::{
    dto::checkout::{ContactForm, NewAddressForm, PaymentForm},
    validate::{self, FieldErrors},
};

/// Error key for the shipping-selection rule, which is not tied to a single
/// input field.
pub const ADDRESS_ERROR: &str = "address";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStep {
    #[default]
    Contact,
    Shipping,
    Payment,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    FullName,
    Phone,
    AddressLabel,
    AddressLine1,
    AddressLine2,
    AddressCity,
    AddressState,
    AddressZip,
    CardNumber,
    CardholderName,
    Expiry,
    Cvv,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::FullName => "full_name",
            Field::Phone => "phone",
            Field::AddressLabel => "label",
            Field::AddressLine1 => "line1",
            Field::AddressLine2 => "line2",
            Field::AddressCity => "city",
            Field::AddressState => "state",
            Field::AddressZip => "zip_code",
            Field::CardNumber => "card_number",
            Field::CardholderName => "cardholder_name",
            Field::Expiry => "expiry",
            Field::Cvv => "cvv",
        }
    }
}

/// The in-progress checkout wizard. Forward transitions are gated on per-step
/// validation; backward transitions are unconditional. `Completed` is
/// terminal; a fresh checkout starts a new draft.
#[derive(Debug, Default, Clone)]
pub struct CheckoutDraft {
    pub contact: ContactForm,
    pub payment: PaymentForm,
    selected_address_id: Option<Uuid>,
    new_address: Option<NewAddressForm>,
    step: CheckoutStep,
    field_errors: FieldErrors,
}

impl CheckoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn selected_address_id(&self) -> Option<Uuid> {
        self.selected_address_id
    }

    pub fn new_address_form(&self) -> Option<&NewAddressForm> {
        self.new_address.as_ref()
    }

    /// Re-typing into a field clears that field's error and nothing else.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Email => self.contact.email = value,
            Field::FullName => self.contact.full_name = value,
            Field::Phone => self.contact.phone = value,
            Field::AddressLabel => self.address_form_mut().label = value,
            Field::AddressLine1 => self.address_form_mut().line1 = value,
            Field::AddressLine2 => {
                self.address_form_mut().line2 = (!value.is_empty()).then_some(value)
            }
            Field::AddressCity => self.address_form_mut().city = value,
            Field::AddressState => self.address_form_mut().state = value,
            Field::AddressZip => self.address_form_mut().zip_code = value,
            Field::CardNumber => self.payment.card_number = value,
            Field::CardholderName => self.payment.cardholder_name = value,
            Field::Expiry => self.payment.expiry = value,
            Field::Cvv => self.payment.cvv = value,
        }
        self.field_errors.remove(field.key());
    }

    /// Typing into an address field opens the sub-form, switching the
    /// shipping selection to the new-address path.
    fn address_form_mut(&mut self) -> &mut NewAddressForm {
        self.selected_address_id = None;
        self.new_address.get_or_insert_with(NewAddressForm::default)
    }

    /// The shipping selection is either a saved address or the sub-form,
    /// never both.
    pub fn open_new_address(&mut self) {
        self.selected_address_id = None;
        self.new_address.get_or_insert_with(NewAddressForm::default);
    }

    pub(crate) fn select_address(&mut self, id: Uuid) {
        self.selected_address_id = Some(id);
        self.new_address = None;
        self.field_errors.remove(ADDRESS_ERROR);
    }

    /// Attempts the forward transition for the current step and returns the
    /// step afterwards. A failed gate stays put and records field errors.
    pub fn advance(&mut self) -> CheckoutStep {
        match self.step {
            CheckoutStep::Contact => {
                let errors = validate::validate_contact(&self.contact);
                if errors.is_empty() {
                    self.step = CheckoutStep::Shipping;
                } else {
                    self.field_errors.extend(errors);
                }
            }
            CheckoutStep::Shipping => {
                if self.selected_address_id.is_some() {
                    self.step = CheckoutStep::Payment;
                } else if let Some(form) = &self.new_address {
                    // An open sub-form must be submitted before the wizard
                    // can move on, even when its fields are valid.
                    self.field_errors.extend(validate::validate_new_address(form));
                    self.field_errors
                        .entry(ADDRESS_ERROR.to_string())
                        .or_insert_with(|| "Save the new address before continuing".to_string());
                } else {
                    self.field_errors.insert(
                        ADDRESS_ERROR.to_string(),
                        "Select a shipping address".to_string(),
                    );
                }
            }
            // Payment -> Completed goes through order placement, not advance().
            CheckoutStep::Payment | CheckoutStep::Completed => {}
        }
        self.step
    }

    /// Going back never re-validates. Contact has nothing before it and
    /// Completed has no way back.
    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Shipping => CheckoutStep::Contact,
            CheckoutStep::Payment => CheckoutStep::Shipping,
            other => other,
        };
        self.step
    }

    pub(crate) fn record_errors(&mut self, errors: FieldErrors) {
        self.field_errors.extend(errors);
    }

    pub(crate) fn take_new_address(&mut self) -> Option<NewAddressForm> {
        self.new_address.take()
    }

    pub(crate) fn complete(&mut self) {
        self.step = CheckoutStep::Completed;
    }
}
