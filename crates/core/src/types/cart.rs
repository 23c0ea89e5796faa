//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::{CartItemId, ProductId, Quantity};

/// A cart line referencing a product by id.
///
/// `id` is assigned by whichever store holds the line: the backend's identity
/// column, or the local store's running counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartItemId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Quantity,
}

impl CartItem {
    /// A new, not yet stored, line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: None,
            product_id,
            quantity,
        }
    }
}
