//! `.env` values flow through figment's env layer.
//!
//! Lives in its own test binary because `dotenvy` writes to the real process
//! environment.

use figment::Jail;
use lift_config::LiftConfig;

#[test]
fn dotenv_file_sets_session_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "LIFTLOG_SESSION__DEFAULT_REPS=8\n")?;

        let config = LiftConfig::load_with_dotenv().expect("config loads");
        assert_eq!(config.session.default_reps, 8);
        Ok(())
    });
}
