//! Surrogate identifiers for ledger records.
//!
//! Every record is keyed by a database-assigned `BIGINT`. The newtypes keep a
//! student id from being passed where a staff id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = i64)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw database identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Login account identifier.
    AccountId
);
define_id!(
    /// Student profile identifier.
    StudentId
);
define_id!(
    /// Staff profile identifier.
    StaffId
);
define_id!(
    /// Confirmation request identifier.
    RequestId
);
define_id!(
    /// Service log entry identifier.
    LogEntryId
);
define_id!(
    /// Accolade identifier.
    AccoladeId
);
