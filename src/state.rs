use uuid::Uuid;

use crate::{cart::CartLedger, config::AppConfig, models::Address, storage::CartStore};

/// Explicit state container owned by the top-level context and passed by
/// reference to the services; there are no ambient singletons.
pub struct AppState {
    pub config: AppConfig,
    pub ledger: CartLedger,
    pub addresses: Vec<Address>,
}

impl AppState {
    /// Seeds the ledger from whatever the store has persisted.
    pub fn new(config: AppConfig, store: &impl CartStore) -> Self {
        let ledger = CartLedger::from_items(store.load());
        Self {
            config,
            ledger,
            addresses: Vec::new(),
        }
    }

    pub fn address(&self, id: Uuid) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    /// Addresses are append-only; the first saved one becomes the default.
    pub fn push_address(&mut self, mut address: Address) -> Uuid {
        if self.addresses.is_empty() {
            address.is_default = true;
        }
        let id = address.id;
        self.addresses.push(address);
        id
    }
}
