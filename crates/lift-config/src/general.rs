//! General application configuration.

use lift_core::ids::PersonId;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Person used when `--person` is not given.
    #[serde(default)]
    pub default_person: Option<PersonId>,
}

impl GeneralConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self.default_person {
            Some(person) if !person.is_valid() => Err(ConfigError::InvalidValue {
                field: "general.default_person".to_string(),
                reason: format!("person ids start at 1 (got {person})"),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_person, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_person_is_rejected() {
        let config = GeneralConfig {
            default_person: Some(PersonId(0)),
        };
        assert!(config.validate().is_err());
    }
}
