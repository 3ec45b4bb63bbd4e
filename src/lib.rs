//! tagshelf - tag files on disk and find them by tag

pub mod cli;
pub mod domain;
pub mod reconcile;
pub mod service;
pub mod store;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_add, handle_check, handle_color, handle_completions, handle_delete_tag,
        handle_list, handle_new_tag, handle_retag, handle_rm, handle_show, handle_tag,
        handle_tags, handle_touch, handle_untag,
    },
    logging,
};
use service::TagService;
use store::TagStore;

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init(logging::level_for(cli.verbose, config.log_level.as_deref()));

    if let Command::Completions(args) = &cli.command {
        return handle_completions(args);
    }

    let db_path = config.database_path(cli.db.as_ref());
    let store = TagStore::open_with(&db_path, &config.store_options())
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let service = TagService::new(&store);

    let reconcile = config.reconcile_on_startup()
        && !cli.no_reconcile
        && !matches!(cli.command, Command::Check(_));
    if reconcile && let Err(err) = service.check_missing() {
        tracing::warn!(error = %err, detail = %err.detail, "startup missing-file check failed");
    }

    match &cli.command {
        Command::Add(args) => handle_add(args, &service),
        Command::List(args) => handle_list(args, &service),
        Command::Show(args) => handle_show(args, &service),
        Command::Tag(args) => handle_tag(args, &service),
        Command::Untag(args) => handle_untag(args, &service),
        Command::Retag(args) => handle_retag(args, &service),
        Command::Rm(args) => handle_rm(args, &service),
        Command::Touch(args) => handle_touch(args, &service),
        Command::Tags(args) => handle_tags(args, &service),
        Command::NewTag(args) => handle_new_tag(args, &service),
        Command::DeleteTag(args) => handle_delete_tag(args, &service),
        Command::Color(args) => handle_color(args, &service),
        Command::Check(args) => handle_check(args, &service),
        Command::Completions(args) => handle_completions(args),
    }
}
