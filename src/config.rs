use std::{collections::HashMap, env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cart_path: PathBuf,
    pub submit_timeout: Duration,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let cart_path = env::var("CART_PATH")
            .unwrap_or_else(|_| "cart.json".to_string())
            .into();
        let submit_timeout = env::var("ORDER_SUBMIT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(20));
        Ok(Self {
            cart_path,
            submit_timeout,
            pricing: PricingConfig::default(),
        })
    }
}

/// All amounts are integer cents; all rates are basis points.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub tax_rate_bps: i64,
    pub shipping_fee: i64,
    /// Shipping is free when the subtotal strictly exceeds this amount.
    pub free_shipping_over: i64,
    pub promo_codes: HashMap<String, i64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let promo_codes = HashMap::from([
            ("SAVE10".to_string(), 1000),
            ("WELCOME15".to_string(), 1500),
            ("FIRST20".to_string(), 2000),
        ]);
        Self {
            tax_rate_bps: 800,
            shipping_fee: 999,
            free_shipping_over: 10_000,
            promo_codes,
        }
    }
}
