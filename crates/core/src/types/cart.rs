//! Cart line item.

use serde::{Deserialize, Serialize};

use super::Product;

/// A single cart entry: one product with a quantity.
///
/// The cart holds at most one entry per product id; adding the same product
/// again increments the quantity instead of appending a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line total for this entry.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}
