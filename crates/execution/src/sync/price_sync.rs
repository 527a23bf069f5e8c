//! Current price of the selected pair.

use crate::state::{Action, Store};
use fleeditto_domain::value_objects::PriceRange;
use fleeditto_protocols::price_service::PriceService;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Writes the relative price of token A in token B into the store.
///
/// The first price seen for a pair also sets the default range around it; later
/// refreshes leave a user-edited range alone.
#[derive(Clone)]
pub struct PriceSync {
    store: Store,
    prices: PriceService,
    ranged_pairs: Arc<RwLock<HashSet<String>>>,
}

impl PriceSync {
    pub fn new(store: Store, prices: PriceService) -> Self {
        Self {
            store,
            prices,
            ranged_pairs: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Fetches and applies the price. Feed errors go to the state error.
    ///
    /// A result for a pair that is no longer selected is dropped.
    pub async fn refresh(&self) -> Option<Decimal> {
        let (token_a, token_b) = self.selected_pair();
        if token_a.is_empty() || token_b.is_empty() {
            return None;
        }

        let result = self.prices.relative_price(&token_a, &token_b).await;
        if self.selected_pair() != (token_a.clone(), token_b.clone()) {
            debug!(token_a = %token_a, token_b = %token_b, "Selection changed, dropping price");
            return None;
        }

        match result {
            Ok(Some(price)) => {
                self.apply_price(&token_a, &token_b, price).await;
                Some(price)
            }
            Ok(None) => {
                debug!(token_a = %token_a, token_b = %token_b, "No price for pair");
                None
            }
            Err(e) => {
                warn!(token_a = %token_a, token_b = %token_b, error = %e, "Price fetch failed");
                self.store
                    .dispatch(Action::SetError(Some(format!("Failed to fetch token prices: {e}"))));
                None
            }
        }
    }

    fn selected_pair(&self) -> (String, String) {
        self.store
            .select(|s| (s.token_a.address.clone(), s.token_b.address.clone()))
    }

    pub async fn apply_price(&self, token_a: &str, token_b: &str, price: Decimal) {
        self.store.dispatch(Action::SetCurrentPrice(Some(price)));
        if price <= Decimal::ZERO {
            return;
        }

        let pair = format!("{token_a}-{token_b}");
        if !self.ranged_pairs.write().await.insert(pair) {
            return;
        }
        if let Ok(range) = PriceRange::default_around(price) {
            info!(
                token_a = %token_a,
                token_b = %token_b,
                min_price = %range.min_price,
                max_price = %range.max_price,
                "Applied default price range"
            );
            self.store.dispatch(Action::SetPriceRange {
                min_price: Some(range.min_price),
                max_price: Some(range.max_price),
            });
        }
    }
}
