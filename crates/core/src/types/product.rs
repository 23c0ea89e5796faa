//! Catalog product.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Price, ProductId};

/// A product row from the backend's `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Price,
    /// Image URL used for the card and the gallery.
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        rename = "isAccessory",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub is_accessory: bool,
}

impl Product {
    /// Whether the product belongs on the clothing listing.
    #[must_use]
    pub const fn is_clothing(&self) -> bool {
        !self.is_accessory
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts `true`, `1`, `"true"`, `"TRUE"`, `"yes"`; everything else is false.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        None => false,
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Int(i)) => i != 0,
        Some(RawFlag::Text(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1"
        }
    })
}
