use std::path::PathBuf;

use anyhow::Context;
use lift_config::LiftConfig;
use lift_core::ids::PersonId;
use lift_db::service::LiftService;
use lift_engine::{SessionController, SessionOptions};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: LiftConfig,
    pub project_root: PathBuf,
    pub controller: SessionController<LiftService>,
    pub person: Option<PersonId>,
}

impl AppContext {
    /// Open the project database and select the requested person.
    ///
    /// `--person` wins over `general.default_person`.
    pub async fn init(
        project_root: PathBuf,
        config: LiftConfig,
        person_flag: Option<i64>,
    ) -> anyhow::Result<Self> {
        let db_path = config.database.resolve(&project_root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let service = LiftService::new_local(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        tracing::debug!(path = %db_path.display(), "database opened");

        let options = SessionOptions {
            draft_defaults: config.session.draft_defaults(),
        };
        let controller = SessionController::new(service, options);

        let person = person_flag.map(PersonId).or(config.general.default_person);
        if let Some(person_id) = person {
            anyhow::ensure!(
                person_id.is_valid(),
                "person ids start at 1 (got {person_id})"
            );
            controller.select_person(person_id);
        }

        Ok(Self {
            config,
            project_root,
            controller,
            person,
        })
    }

    #[must_use]
    pub fn service(&self) -> &LiftService {
        self.controller.gateway()
    }

    /// The selected person, or an error telling the user how to pick one.
    pub fn require_person(&self) -> anyhow::Result<PersonId> {
        self.person.context(
            "no person selected: pass --person or set general.default_person in .liftlog/config.toml",
        )
    }
}
