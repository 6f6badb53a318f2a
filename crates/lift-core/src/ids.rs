//! Typed identifiers.
//!
//! The persistence layer hands out plain integer row ids. Wrapping them keeps
//! an entry id from being passed where an exercise id is expected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Identity of a persisted workout entry, assigned on create.
    EntryId
);

integer_id!(
    /// The person a workout entry belongs to.
    PersonId
);

integer_id!(
    /// The exercise catalog item an entry or draft refers to.
    ExerciseId
);

impl ExerciseId {
    /// Whether this id refers to a real exercise. Zero means "nothing selected".
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0 > 0
    }
}

impl PersonId {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}
