use std::path::{Path, PathBuf};

use anyhow::Context;
use lift_config::PROJECT_DIR;

/// Where the project lives: `--project` if given, otherwise the nearest
/// ancestor of `cwd` holding a `.liftlog` directory.
///
/// `--project` may name the project directory or its `.liftlog` directory.
pub fn resolve_project_root(project_flag: Option<&Path>, cwd: &Path) -> anyhow::Result<PathBuf> {
    let Some(flag) = project_flag else {
        return cwd
            .ancestors()
            .find(|dir| is_project(dir))
            .map(Path::to_path_buf)
            .context("not a liftlog project (no .liftlog directory found). Run 'lift init' first.");
    };

    if flag.file_name().is_some_and(|name| name == PROJECT_DIR) {
        return flag
            .parent()
            .map(Path::to_path_buf)
            .context("invalid --project: '.liftlog' has no parent directory");
    }
    anyhow::ensure!(
        flag.is_dir(),
        "invalid --project '{}': directory does not exist",
        flag.display()
    );
    Ok(flag.to_path_buf())
}

fn is_project(dir: &Path) -> bool {
    dir.join(PROJECT_DIR).is_dir()
}
