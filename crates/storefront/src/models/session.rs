//! Session-related types.
//!
//! The visitor's session is their persistent local store: the cart,
//! addresses and orders kept there when the backend is unconfigured or
//! unavailable, plus the login state.

use serde::{Deserialize, Serialize};

/// Session payload returned by the auth service, kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendSession(pub serde_json::Value);

/// Session keys for locally stored data.
pub mod keys {
    /// Cart lines (`Vec<CartItem>`).
    pub const CART: &str = "cart";

    /// Saved delivery addresses (`Vec<Address>`).
    pub const ADDRESSES: &str = "userAddresses";

    /// Orders placed without a backend (`Vec<Order>`).
    pub const ORDERS: &str = "orders";

    /// Email of the logged-in visitor.
    pub const LOGGED_IN_USER: &str = "loggedInUser";

    /// Auth service session payload.
    pub const BACKEND_SESSION: &str = "backendSession";
}
