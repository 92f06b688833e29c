use std::{future::Future, time::Duration};

use serde::Serialize;

use crate::models::{Address, CartLineItem, Totals};

/// What the remote order endpoint receives: the cart snapshot plus a masked
/// payment reference.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
    pub items: Vec<CartLineItem>,
    pub totals: Totals,
    pub shipping_address: Address,
    pub payment_ref: String,
}

/// The backend collaborator the checkout flow talks to. Transport is out of
/// scope; implementations wrap whatever request/response API is available.
pub trait OrderGateway {
    fn submit_order(
        &self,
        submission: &OrderSubmission,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Seeds the saved-address options on the shipping step.
    fn fetch_addresses(&self) -> impl Future<Output = anyhow::Result<Vec<Address>>> + Send;
}

/// Stand-in for the real backend; accepts every order after a fixed delay.
pub struct SimulatedGateway {
    pub latency: Duration,
}

impl OrderGateway for SimulatedGateway {
    async fn submit_order(&self, _submission: &OrderSubmission) -> anyhow::Result<()> {
        tokio::time::sleep(self.latency).await;
        Ok(())
    }

    async fn fetch_addresses(&self) -> anyhow::Result<Vec<Address>> {
        Ok(Vec::new())
    }
}
