//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types exchanged between the storefront, the hosted
//! REST backend and the visitor's local store:
//! - `Product` - catalog entries (read-only from the storefront's perspective)
//! - `CartItem` - cart lines referencing products by id
//! - `Address` - delivery addresses collected during checkout
//! - `Order` - immutable snapshot created once per checkout
//! - `UserProfile` - the profile row kept in the backend's `users` table
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Wire formats follow the backend's column names so the same types
//! deserialize from REST responses and from the local store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
