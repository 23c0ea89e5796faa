//! Cart service.
//!
//! Cart lines live in the backend's `cart` table when a backend is
//! configured, otherwise under the visitor's local `cart` key.
//!
//! The two stores deduplicate differently: the local store merges lines by
//! product id, the backend gets a new row for every add.

use serde::Deserialize;
use shopfront_core::{CartItem, CartItemId, ProductId, Quantity};
use tracing::{debug, instrument};

use crate::backend::Filter;
use crate::storage::{Resource, Storage, StorageError};

/// Only the quantity column, for the badge count.
#[derive(Debug, Deserialize)]
struct QuantityRow {
    #[serde(default)]
    quantity: Quantity,
}

/// Cart operations for the current visitor.
pub struct CartService<'a> {
    storage: &'a Storage,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All cart lines. Backend failures fall back to the local lines.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Vec<CartItem> {
        self.storage
            .read(Resource::Cart, &Filter::new().select("*"))
            .await
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert or the local
    /// store fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), StorageError> {
        if let Some(client) = self.storage.remote() {
            client
                .insert(Resource::Cart.table(), &CartItem::new(product_id, quantity))
                .await?;
            return Ok(());
        }

        let mut lines: Vec<CartItem> = self.storage.local_rows(Resource::Cart).await?;
        if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            let mut line = CartItem::new(product_id, quantity);
            line.id = Some(next_local_id(&lines));
            lines.push(line);
        }
        debug!(lines = lines.len(), "Saving local cart");
        self.storage.set_local_rows(Resource::Cart, &lines).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete or the local
    /// store fails.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, cart_id: CartItemId) -> Result<(), StorageError> {
        if let Some(client) = self.storage.remote() {
            client
                .delete(Resource::Cart.table(), &Filter::new().eq("id", cart_id))
                .await?;
            return Ok(());
        }

        let mut lines: Vec<CartItem> = self.storage.local_rows(Resource::Cart).await?;
        lines.retain(|l| l.id != Some(cart_id));
        self.storage.set_local_rows(Resource::Cart, &lines).await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the local
    /// store fails.
    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        cart_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), StorageError> {
        if let Some(client) = self.storage.remote() {
            client
                .update(
                    Resource::Cart.table(),
                    &Filter::new().eq("id", cart_id),
                    &serde_json::json!({ "quantity": quantity }),
                )
                .await?;
            return Ok(());
        }

        let mut lines: Vec<CartItem> = self.storage.local_rows(Resource::Cart).await?;
        if let Some(line) = lines.iter_mut().find(|l| l.id == Some(cart_id)) {
            line.quantity = quantity;
        }
        self.storage.set_local_rows(Resource::Cart, &lines).await
    }

    /// Total units across all lines, for the header badge.
    #[instrument(skip(self))]
    pub async fn cart_count(&self) -> u32 {
        self.storage
            .read::<QuantityRow>(Resource::Cart, &Filter::new().select("quantity"))
            .await
            .iter()
            .fold(0u32, |sum, row| sum.saturating_add(row.quantity.get()))
    }

    /// Drop the locally stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub async fn clear_local(&self) -> Result<(), StorageError> {
        self.storage.clear_local(Resource::Cart).await
    }
}

fn next_local_id(lines: &[CartItem]) -> CartItemId {
    let max = lines
        .iter()
        .filter_map(|l| l.id.map(|id| id.as_i64()))
        .max()
        .unwrap_or(0);
    CartItemId::new(max + 1)
}
