//! Delivery addresses.

use serde::{Deserialize, Serialize};

use crate::AddressId;

/// A delivery address owned by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Backend id, present only for addresses read from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub name: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
}

/// Errors from validating an [`AddressForm`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Raw address form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub phone: String,
}

impl AddressForm {
    /// Trim every field and require all five.
    ///
    /// # Errors
    ///
    /// Returns the first field (in form order) that is blank after trimming.
    pub fn validate(&self) -> Result<Address, AddressError> {
        fn required(value: &str, field: &'static str) -> Result<String, AddressError> {
            let value = value.trim();
            if value.is_empty() {
                Err(AddressError::MissingField(field))
            } else {
                Ok(value.to_owned())
            }
        }

        Ok(Address {
            id: None,
            name: required(&self.name, "name")?,
            street: required(&self.street, "street")?,
            city: required(&self.city, "city")?,
            zip: required(&self.zip, "zip")?,
            phone: required(&self.phone, "phone")?,
        })
    }
}
