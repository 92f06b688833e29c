use std::{fs, path::PathBuf, sync::Mutex};

use crate::{error::AppResult, models::CartLineItem};

/// Write-through persistence for the cart ledger. The ledger itself stays
/// pure; services call `save` after every mutation.
pub trait CartStore {
    /// Missing or malformed data falls back to an empty cart.
    fn load(&self) -> Vec<CartLineItem>;
    fn save(&self, items: &[CartLineItem]) -> AppResult<()>;
}

/// Persists the line-item set as a JSON array in a single file, the durable
/// slot the cart survives in between sessions.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStore for JsonFileStore {
    fn load(&self) -> Vec<CartLineItem> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "discarding malformed cart data"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[CartLineItem]) -> AppResult<()> {
        let raw = serde_json::to_string(items)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<CartLineItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Vec<CartLineItem> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    fn save(&self, items: &[CartLineItem]) -> AppResult<()> {
        if let Ok(mut slot) = self.items.lock() {
            *slot = items.to_vec();
        }
        Ok(())
    }
}
