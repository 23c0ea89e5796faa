//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Login and signup against the auth service, with local fallback
//! - `cart` - Cart line CRUD and the badge count
//! - `catalog` - Cached product reads
//! - `checkout` - Addresses and order placement

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService, LoginOutcome, SignupOutcome};
pub use cart::CartService;
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutError, CheckoutService, CheckoutState};
