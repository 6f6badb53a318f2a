use std::path::{Path, PathBuf};

use anyhow::Context;
use lift_config::{LiftConfig, PROJECT_DIR};
use lift_core::ids::PersonId;
use lift_db::service::LiftService;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

const GITIGNORE: &str = "# local liftlog state\n*.db\n*.db-*\n*.db.lock\n";

/// Handle `lift init`.
///
/// Writes `.liftlog/config.toml` and creates the database with its schema.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let project_root = match flags.project.as_deref() {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let summary = init_project(&project_root, args.person.or(flags.person), args.force).await?;
    output(&summary, flags.format)
}

async fn init_project(
    project_root: &Path,
    person: Option<i64>,
    force: bool,
) -> anyhow::Result<serde_json::Value> {
    let config_path = LiftConfig::project_config_path(project_root);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            config_path.display()
        );
    }

    let mut config = LiftConfig::default();
    config.general.default_person = person.map(PersonId);
    config.validate()?;

    let state_dir = project_root.join(PROJECT_DIR);
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("failed to create {}", state_dir.display()))?;
    std::fs::write(&config_path, render_project_config(&config)?)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    std::fs::write(state_dir.join(".gitignore"), GITIGNORE)
        .context("failed to write .liftlog/.gitignore")?;

    let db_path = config.database.resolve(project_root);
    LiftService::new_local(&db_path.to_string_lossy())
        .await
        .with_context(|| format!("failed to create database at {}", db_path.display()))?;
    tracing::info!(root = %project_root.display(), "project initialized");

    Ok(json!({
        "project_root": project_root,
        "config": config_path,
        "database": db_path,
        "default_person": config.general.default_person,
    }))
}

fn render_project_config(config: &LiftConfig) -> anyhow::Result<String> {
    let body = toml::to_string_pretty(config).context("failed to serialize config")?;
    Ok(format!(
        "# liftlog project configuration\n# Environment variables (LIFTLOG_SECTION__KEY) override these values.\n\n{body}"
    ))
}
