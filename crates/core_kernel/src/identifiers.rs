//! Strongly-typed identifiers for domain entities
//!
//! The persistence layer assigns opaque numeric ids to every entity.
//! Newtype wrappers around those raw values provide type safety and
//! prevent accidental mixing of different identifier types. Ids are never
//! generated in-process; they are constructed from the raw value returned
//! by the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw id assigned by the persistence layer
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw id value
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Property identifiers
define_id!(DormitoryId, "DORM");
define_id!(RoomId, "ROOM");
define_id!(TenantId, "TNT");

// Billing identifiers
define_id!(InvoiceId, "INV");
define_id!(LineItemId, "ITM");
define_id!(PaymentId, "PAY");
