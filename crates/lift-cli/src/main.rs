use std::path::Path;

use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;
mod ui;
mod write_lock;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("lift error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match &cli.command {
        cli::Commands::Init(args) => return commands::init::handle(args, &flags).await,
        cli::Commands::Schema(args) => return commands::schema::handle(args, &flags),
        _ => {}
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let project_root =
        context::resolve_project_root(flags.project.as_deref().map(Path::new), &cwd)?;
    let _ = dotenvy::from_path(project_root.join(".env"));
    let config = lift_config::LiftConfig::load_in(&project_root)
        .context("failed to load liftlog configuration")?;
    context::warn_unconfigured(&config);

    let command = cli.command;
    let write_lock = match write_label(&command) {
        Some(label) => {
            let db_path = config.database.resolve(&project_root);
            Some(write_lock::acquire(&db_path, label).await?)
        }
        None => None,
    };

    let ctx = context::AppContext::init(project_root, config, flags.person)
        .await
        .context("failed to initialize liftlog application context")?;

    let result = commands::dispatch::dispatch(command, &ctx, &flags).await;
    drop(write_lock);
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LIFTLOG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Name recorded in the write lock, or `None` for commands that only read.
fn write_label(command: &cli::Commands) -> Option<&'static str> {
    use crate::cli::subcommands::{DayCommands, EntryCommands, GroupCommands};

    match command {
        cli::Commands::Day { action } => match action {
            DayCommands::Save { .. } => Some("day save"),
            DayCommands::Renumber { .. } => Some("day renumber"),
            DayCommands::Show { .. } => None,
        },
        cli::Commands::Entry { action } => match action {
            EntryCommands::Delete { .. } => Some("entry delete"),
            EntryCommands::Move { .. } => Some("entry move"),
        },
        cli::Commands::Group { action } => match action {
            GroupCommands::Next { .. } => None,
        },
        cli::Commands::Week(_) | cli::Commands::Init(_) | cli::Commands::Schema(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::write_label;
    use crate::cli::Cli;

    fn label(args: &[&str]) -> Option<&'static str> {
        let cli = Cli::try_parse_from(args).expect("cli should parse");
        write_label(&cli.command)
    }

    #[test]
    fn reads_skip_the_write_lock() {
        assert_eq!(label(&["lift", "day", "show", "2026-03-02"]), None);
        assert_eq!(label(&["lift", "week"]), None);
        assert_eq!(label(&["lift", "group", "next", "2026-03-02"]), None);
    }

    #[test]
    fn writes_name_themselves_in_the_lock() {
        assert_eq!(label(&["lift", "day", "renumber", "2026-03-02"]), Some("day renumber"));
        assert_eq!(label(&["lift", "entry", "delete", "4"]), Some("entry delete"));
        assert_eq!(
            label(&["lift", "entry", "move", "4", "--group", "2"]),
            Some("entry move")
        );
    }
}
