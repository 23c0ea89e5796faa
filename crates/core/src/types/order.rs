//! Orders, payment methods and order status.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Address, CartItem, OrderId, Price};

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "credit_card")]
    CreditCard,
    #[serde(rename = "upi")]
    Upi,
    #[serde(rename = "netbanking")]
    NetBanking,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// All methods in the order they are offered.
    pub const ALL: [Self; 4] = [
        Self::CreditCard,
        Self::Upi,
        Self::NetBanking,
        Self::CashOnDelivery,
    ];

    /// Wire value, also used as the form value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Upi => "upi",
            Self::NetBanking => "netbanking",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit/Debit Card",
            Self::Upi => "UPI",
            Self::NetBanking => "Net Banking",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}

/// Order lifecycle status.
///
/// Orders sent to the backend start as `pending`; orders kept only in the
/// local store are recorded as `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// An order: a snapshot of the cart and address at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default, deserialize_with = "json_or_string")]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
    #[serde(default, deserialize_with = "json_or_string")]
    pub address: Option<Address>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Name on the delivery address, or `N/A`.
    #[must_use]
    pub fn address_name(&self) -> &str {
        self.address.as_ref().map_or("N/A", |a| a.name.as_str())
    }
}

/// Backend rows store snapshots as JSON-encoded text columns; local rows
/// store them inline. An undecodable string becomes the empty value.
fn json_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(T::default()),
        serde_json::Value::String(text) => Ok(serde_json::from_str(&text).unwrap_or_default()),
        value => serde_json::from_value(value).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{ProductId, Quantity};

    #[test]
    fn test_payment_method_wire_values() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_backend_row_with_encoded_snapshots() {
        let json = r#"{
            "id": 17,
            "items": "[{\"id\":3,\"product_id\":42,\"quantity\":2}]",
            "total": 1998,
            "address": "{\"name\":\"Asha\",\"street\":\"1 Main\",\"city\":\"Pune\",\"zip\":\"411001\",\"phone\":\"98\"}",
            "payment_method": "upi",
            "status": "pending",
            "created_at": "2025-01-05T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, Some(OrderId::new(17)));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, ProductId::new(42));
        assert_eq!(order.items[0].quantity, Quantity::new(2).unwrap());
        assert_eq!(order.address_name(), "Asha");
        assert_eq!(order.payment_method, PaymentMethod::Upi);
    }

    #[test]
    fn test_undecodable_address_string_is_absent() {
        let order: Order =
            serde_json::from_str(r#"{"id": 1, "address": "not json", "total": 0}"#).unwrap();
        assert!(order.address.is_none());
        assert_eq!(order.address_name(), "N/A");
    }
}
