use std::time::Duration;

use storefront_checkout::{
    checkout::{CheckoutDraft, Field},
    config::AppConfig,
    dto::cart::AddItemRequest,
    gateway::SimulatedGateway,
    services::{cart_service, checkout_service},
    state::AppState,
    storage::JsonFileStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_checkout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = JsonFileStore::new(config.cart_path.clone());
    let mut state = AppState::new(config, &store);

    let gateway = SimulatedGateway {
        latency: Duration::from_millis(200),
    };
    checkout_service::load_saved_addresses(&mut state, &gateway).await?;

    cart_service::add_item(
        &mut state,
        &store,
        AddItemRequest {
            product_id: 1,
            name: "Axum Hoodie".into(),
            unit_price: 5500,
            quantity: 1,
            image_ref: "hoodie.png".into(),
        },
    )?;
    cart_service::add_item(
        &mut state,
        &store,
        AddItemRequest {
            product_id: 2,
            name: "Ferris Mug".into(),
            unit_price: 1200,
            quantity: 2,
            image_ref: "mug.png".into(),
        },
    )?;
    cart_service::apply_promo(&mut state, "save10")?;

    let totals = cart_service::totals(&state);
    println!(
        "Cart: subtotal {} shipping {} discount {} tax {} total {}",
        cents(totals.subtotal),
        cents(totals.shipping_fee),
        cents(totals.discount),
        cents(totals.tax),
        cents(totals.grand_total),
    );

    let mut draft = CheckoutDraft::new();
    draft.set_field(Field::Email, "user@example.com");
    draft.set_field(Field::FullName, "Sample User");
    draft.set_field(Field::Phone, "555-0100");
    draft.advance();

    draft.set_field(Field::AddressLabel, "Home");
    draft.set_field(Field::AddressLine1, "1 Main St");
    draft.set_field(Field::AddressCity, "Springfield");
    draft.set_field(Field::AddressState, "IL");
    draft.set_field(Field::AddressZip, "62701");
    checkout_service::submit_new_address(&mut state, &mut draft)?;
    draft.advance();

    draft.set_field(Field::CardNumber, "4111 1111 1111 1111");
    draft.set_field(Field::CardholderName, "Sample User");
    draft.set_field(Field::Expiry, "12/27");
    draft.set_field(Field::Cvv, "123");

    match checkout_service::place_order(&mut state, &store, &mut draft, &gateway).await? {
        Some(order) => println!(
            "Order {} placed, charged {} to {}",
            order.order_id,
            cents(order.totals.grand_total),
            order.payment_ref
        ),
        None => println!("Payment rejected: {:?}", draft.field_errors()),
    }

    Ok(())
}

fn cents(amount: i64) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
