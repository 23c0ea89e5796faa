//! Core types for Shopfront.
//!
//! Rows and form values the storefront reads from and writes to storage.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod user;

pub use address::{Address, AddressError, AddressForm};
pub use cart::CartItem;
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderStatus, PaymentMethod};
pub use price::Price;
pub use product::Product;
pub use quantity::Quantity;
pub use user::{UserMetadata, UserProfile};
