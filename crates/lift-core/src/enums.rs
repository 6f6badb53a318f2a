//! User-facing enums for liftlog.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Error category surfaced to the UI through the published projection.
///
/// ```text
/// validation            - a draft cannot be saved; nothing reached the gateway
/// transport             - a gateway call failed; state was rolled back or resynced
/// confirmation_required - clearing the whole day needs an explicit confirmation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    ConfirmationRequired,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::ConfirmationRequired => "confirmation_required",
        }
    }

    /// Whether the flow is paused waiting on the user rather than failed.
    #[must_use]
    pub const fn is_prompt(self) -> bool {
        matches!(self, Self::ConfirmationRequired)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
