//! Checkout: delivery addresses and order placement.
//!
//! ```text
//! AddressList ──add──▶ AddAddressForm ──save──▶ AddressList
//!      │
//!      └──place──▶ PlacingOrder ──▶ OrderPlaced ──(3s)──▶ /
//! ```
//!
//! Addresses are always written to the local store first; the backend copy
//! is best effort. When reading, local addresses win and the backend is only
//! consulted when there are none.

use std::collections::BTreeSet;

use chrono::Utc;
use shopfront_core::{
    Address, AddressError, AddressForm, CartItem, Order, OrderId, OrderStatus, PaymentMethod,
    Price, ProductId,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{BackendError, Filter};
use crate::services::cart::CartService;
use crate::services::catalog::Catalog;
use crate::storage::{Resource, Storage, StorageError};

/// Seconds the confirmation waits before returning home.
pub const REDIRECT_SECONDS: u32 = 3;

/// Errors from the checkout flow. Messages are shown to the visitor as-is.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please fill all fields")]
    InvalidAddress(#[from] AddressError),

    #[error("Please select an address")]
    NoAddressSelected,

    #[error("Please add an address first")]
    NoAddress,

    #[error("Failed to place order ({status}): {body}")]
    OrderRejected { status: u16, body: String },

    /// The order never reached the backend, or its reply was unusable.
    #[error("Failed to place order: {0}")]
    OrderFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<BackendError> for CheckoutError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, body } => Self::OrderRejected { status, body },
            other => Self::OrderFailed(other.to_string()),
        }
    }
}

/// The cart as it stands when checkout starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Sum of price × quantity over lines whose product is known.
    pub total: Price,
}

/// Everything the address list step shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutState {
    pub cart: CartSnapshot,
    pub addresses: Vec<Address>,
}

/// Checkout operations for the current visitor.
pub struct CheckoutService<'a> {
    storage: &'a Storage,
    catalog: &'a Catalog,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage, catalog: &'a Catalog) -> Self {
        Self { storage, catalog }
    }

    /// Current cart lines and their total.
    #[instrument(skip(self))]
    pub async fn cart_snapshot(&self) -> CartSnapshot {
        let items = CartService::new(self.storage).get_cart().await;

        let ids: Vec<ProductId> = items
            .iter()
            .map(|i| i.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let products = self
            .catalog
            .products_by_ids(&ids)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not load cart products");
                Vec::new()
            });

        let total = items
            .iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| p.price * item.quantity)
            })
            .sum();

        CartSnapshot { items, total }
    }

    /// Cart snapshot plus saved addresses.
    pub async fn state(&self) -> CheckoutState {
        CheckoutState {
            cart: self.cart_snapshot().await,
            addresses: self.addresses().await,
        }
    }

    /// Saved addresses: local ones when there are any, else the backend's.
    #[instrument(skip(self))]
    pub async fn addresses(&self) -> Vec<Address> {
        let local: Vec<Address> = self
            .storage
            .local_rows(Resource::Addresses)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Local addresses unreadable");
                Vec::new()
            });
        if !local.is_empty() {
            return local;
        }

        let Some(client) = self.storage.remote() else {
            return Vec::new();
        };
        client
            .select(Resource::Addresses.table(), &Filter::new().select("*"))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to fetch addresses");
                Vec::new()
            })
    }

    /// Validate and save a new address at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidAddress` when a field is blank, or a
    /// storage error when the local store fails. Backend failures are only
    /// logged.
    #[instrument(skip(self, form))]
    pub async fn save_address(&self, form: &AddressForm) -> Result<Address, CheckoutError> {
        let address = form.validate()?;

        let mut addresses: Vec<Address> = self.storage.local_rows(Resource::Addresses).await?;
        addresses.push(address.clone());
        self.storage
            .set_local_rows(Resource::Addresses, &addresses)
            .await?;
        info!(count = addresses.len(), "Address saved locally");

        if let Some(client) = self.storage.remote()
            && let Err(e) = client.insert(Resource::Addresses.table(), &address).await
        {
            warn!(error = %e, "Backend address save failed, kept locally");
        }

        Ok(address)
    }

    /// Remove the local address at `index`.
    ///
    /// Returns `false` (and logs a warning) when the index is out of range,
    /// leaving the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    #[instrument(skip(self))]
    pub async fn remove_address(&self, index: usize) -> Result<bool, StorageError> {
        let mut addresses: Vec<Address> = self.storage.local_rows(Resource::Addresses).await?;
        if index >= addresses.len() {
            warn!(index, total = addresses.len(), "Invalid address index");
            return Ok(false);
        }

        let removed = addresses.remove(index);
        self.storage
            .set_local_rows(Resource::Addresses, &addresses)
            .await?;

        if let (Some(client), Some(id)) = (self.storage.remote(), removed.id)
            && let Err(e) = client
                .delete(Resource::Addresses.table(), &Filter::new().eq("id", id))
                .await
        {
            warn!(error = %e, address_id = %id, "Backend address removal failed");
        }

        Ok(true)
    }

    /// Place an order for the current cart.
    ///
    /// `selection` is the index of the chosen address. An empty cart is not
    /// an error; the order is created with a zero total.
    ///
    /// # Errors
    ///
    /// - `NoAddressSelected` when addresses exist but none is chosen
    /// - `NoAddress` when no address can be resolved
    /// - `OrderRejected` when the backend refuses the order
    /// - `OrderFailed` when the backend cannot be reached
    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        selection: Option<usize>,
        payment_method: PaymentMethod,
    ) -> Result<Order, CheckoutError> {
        let addresses = self.addresses().await;
        if selection.is_none() && !addresses.is_empty() {
            return Err(CheckoutError::NoAddressSelected);
        }
        let address = selection
            .and_then(|i| addresses.get(i))
            .cloned()
            .ok_or(CheckoutError::NoAddress)?;

        let CartSnapshot { items, total } = self.cart_snapshot().await;
        let cart = CartService::new(self.storage);

        let Some(client) = self.storage.remote() else {
            let order = Order {
                id: Some(local_order_id()),
                items,
                total,
                address: Some(address),
                payment_method,
                status: OrderStatus::Completed,
                created_at: Some(Utc::now()),
            };
            let mut orders: Vec<Order> = self.storage.local_rows(Resource::Orders).await?;
            orders.push(order.clone());
            self.storage.set_local_rows(Resource::Orders, &orders).await?;
            cart.clear_local().await?;
            info!(order_id = ?order.id, "Order stored locally");
            return Ok(order);
        };

        let row = serde_json::json!({
            "items": serde_json::to_string(&items).map_err(BackendError::from)?,
            "total": total,
            "address": serde_json::to_string(&address).map_err(BackendError::from)?,
            "payment_method": payment_method,
            "status": OrderStatus::Pending,
        });

        let order = match client
            .insert_returning::<_, Order>(Resource::Orders.table(), &row)
            .await
        {
            Ok(Some(order)) => order,
            Ok(None) | Err(BackendError::Parse(_)) => {
                warn!("Order response empty or unreadable, using local copy");
                Order {
                    id: Some(local_order_id()),
                    items: items.clone(),
                    total,
                    address: Some(address),
                    payment_method,
                    status: OrderStatus::Pending,
                    created_at: Some(Utc::now()),
                }
            }
            Err(e) => return Err(e.into()),
        };
        info!(order_id = ?order.id, "Order placed");

        for id in items.iter().filter_map(|i| i.id) {
            if let Err(e) = client
                .delete(Resource::Cart.table(), &Filter::new().eq("id", id))
                .await
            {
                warn!(error = %e, cart_id = %id, "Failed to delete cart line");
            }
        }
        if let Err(e) = cart.clear_local().await {
            warn!(error = %e, "Failed to clear local cart");
        }

        Ok(order)
    }
}

fn local_order_id() -> OrderId {
    OrderId::new(Utc::now().timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopfront_core::Quantity;
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::backend::Backend;
    use crate::storage::LocalStorage;

    fn local_storage() -> Storage {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Storage::new(Backend::Local, LocalStorage::new(session))
    }

    fn form(name: &str) -> AddressForm {
        AddressForm {
            name: name.to_string(),
            street: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            zip: "411001".to_string(),
            phone: "+91 9800000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_field_rejected() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);

        let err = checkout.save_address(&form("  ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill all fields");
        assert!(checkout.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_saved_address_appended_verbatim() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);

        checkout.save_address(&form("Asha")).await.unwrap();
        checkout.save_address(&form("Ravi")).await.unwrap();

        let addresses = checkout.addresses().await;
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[1], form("Ravi").validate().unwrap());
    }

    #[tokio::test]
    async fn test_remove_invalid_index_leaves_list() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);
        checkout.save_address(&form("Asha")).await.unwrap();

        assert!(!checkout.remove_address(5).await.unwrap());
        assert_eq!(checkout.addresses().await.len(), 1);

        assert!(checkout.remove_address(0).await.unwrap());
        assert!(checkout.addresses().await.is_empty());
    }

    #[tokio::test]
    async fn test_order_requires_address() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);

        let err = checkout
            .place_order(None, PaymentMethod::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoAddress));

        checkout.save_address(&form("Asha")).await.unwrap();
        let err = checkout
            .place_order(None, PaymentMethod::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoAddressSelected));

        let orders: Vec<Order> = storage.local_rows(Resource::Orders).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_local_order_with_empty_cart() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);
        checkout.save_address(&form("Asha")).await.unwrap();

        let order = checkout.place_order(Some(0), PaymentMethod::Upi).await.unwrap();
        assert_eq!(order.total, Price::ZERO);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.address_name(), "Asha");

        let orders: Vec<Order> = storage.local_rows(Resource::Orders).await.unwrap();
        assert_eq!(orders, vec![order]);
    }

    #[tokio::test]
    async fn test_local_order_clears_cart() {
        let storage = local_storage();
        let catalog = Catalog::new(Backend::Local);
        let checkout = CheckoutService::new(&storage, &catalog);
        let cart = CartService::new(&storage);
        cart.add_to_cart(ProductId::new(42), Quantity::ONE).await.unwrap();
        checkout.save_address(&form("Asha")).await.unwrap();

        let order = checkout
            .place_order(Some(0), PaymentMethod::CashOnDelivery)
            .await
            .unwrap();
        assert_eq!(order.items.len(), 1);
        assert!(cart.get_cart().await.is_empty());
    }

    #[test]
    fn test_backend_errors_become_visitor_messages() {
        let rejected = CheckoutError::from(BackendError::Status {
            status: 400,
            body: "bad order".to_string(),
        });
        assert_eq!(rejected.to_string(), "Failed to place order (400): bad order");

        let unreachable = CheckoutError::from(BackendError::Url(url::ParseError::EmptyHost));
        assert!(matches!(unreachable, CheckoutError::OrderFailed(_)));
        assert!(unreachable.to_string().starts_with("Failed to place order: "));
    }
}
