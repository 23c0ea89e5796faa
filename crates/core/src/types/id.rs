//! Row identifiers.
//!
//! Each table gets its own id type so a cart line id can never be passed
//! where a product id is expected. Backend tables use `bigint` identity
//! columns and locally placed orders use epoch milliseconds, so every id
//! wraps an `i64`.

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        /// Parses the decimal form used in form fields and paths.
        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

row_id!(
    /// Id of a row in the `products` table.
    ProductId
);
row_id!(
    /// Id of a cart line, assigned by the backend or numbered locally.
    CartItemId
);
row_id!(
    /// Id of a saved address.
    AddressId
);
row_id!(
    /// Id of a placed order.
    OrderId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id, ProductId::new(42));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!("abc".parse::<CartItemId>().is_err());
        assert!("".parse::<AddressId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&OrderId::new(1_700_000_000_000)).unwrap();
        assert_eq!(json, "1700000000000");
        assert_eq!(OrderId::new(7).to_string(), "7");
    }
}
