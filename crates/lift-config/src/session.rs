//! Session editor defaults.

use lift_core::entities::DraftDefaults;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_amount() -> u32 {
    1
}

const fn default_week_length_days() -> u32 {
    7
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Sets a new draft row starts with.
    #[serde(default = "default_amount")]
    pub default_sets: u32,

    /// Reps a new draft row starts with.
    #[serde(default = "default_amount")]
    pub default_reps: u32,

    /// Days covered by the week view.
    #[serde(default = "default_week_length_days")]
    pub week_length_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_sets: default_amount(),
            default_reps: default_amount(),
            week_length_days: default_week_length_days(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn draft_defaults(&self) -> DraftDefaults {
        DraftDefaults {
            sets: self.default_sets,
            reps: self.default_reps,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("session.default_sets", self.default_sets),
            ("session.default_reps", self.default_reps),
            ("session.week_length_days", self.week_length_days),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
