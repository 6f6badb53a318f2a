use lift_config::{LiftConfig, SessionConfig};

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &LiftConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &LiftConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if config.session == SessionConfig::default()
        && has_single_underscore_key(&env_keys, "LIFTLOG_SESSION")
    {
        warnings.push(
            "Session config appears default while LIFTLOG_SESSION* env vars exist. Use double underscores (example: LIFTLOG_SESSION__DEFAULT_SETS)."
                .to_string(),
        );
    }

    if config.general.default_person.is_none()
        && has_single_underscore_key(&env_keys, "LIFTLOG_GENERAL")
    {
        warnings.push(
            "No default person is set while LIFTLOG_GENERAL* env vars exist. Use double underscores (example: LIFTLOG_GENERAL__DEFAULT_PERSON)."
                .to_string(),
        );
    }

    if has_single_underscore_key(&env_keys, "LIFTLOG_DATABASE") {
        warnings.push(
            "LIFTLOG_DATABASE* env var is not a nested key and was ignored. Use double underscores (example: LIFTLOG_DATABASE__PATH)."
                .to_string(),
        );
    }

    warnings
}

/// `prefix_X` set, but no `prefix__X`.
fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    let nested = format!("{prefix}__");
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&nested))
}

#[cfg(test)]
mod tests {
    use lift_config::{LiftConfig, SessionConfig};
    use lift_core::ids::PersonId;

    use super::collect_unconfigured_warnings;

    #[test]
    fn warns_for_single_underscore_keys() {
        let config = LiftConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("LIFTLOG_SESSION_DEFAULT_SETS".to_string(), "3".to_string()),
                ("LIFTLOG_GENERAL_DEFAULT_PERSON".to_string(), "2".to_string()),
                ("LIFTLOG_DATABASE_PATH".to_string(), "/tmp/x.db".to_string()),
            ],
        );

        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn does_not_warn_for_nested_keys() {
        let config = LiftConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("LIFTLOG_SESSION__DEFAULT_SETS".to_string(), "1".to_string()),
                ("LIFTLOG_DATABASE__PATH".to_string(), "/tmp/x.db".to_string()),
                ("LIFTLOG_LOG".to_string(), "debug".to_string()),
            ],
        );

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn does_not_warn_when_sections_are_configured() {
        let mut config = LiftConfig::default();
        config.session = SessionConfig {
            default_sets: 3,
            ..SessionConfig::default()
        };
        config.general.default_person = Some(PersonId(2));

        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("LIFTLOG_SESSION_DEFAULT_SETS".to_string(), "3".to_string()),
                ("LIFTLOG_GENERAL_DEFAULT_PERSON".to_string(), "2".to_string()),
            ],
        );

        assert!(warnings.is_empty());
    }
}
