//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod logging;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// tagshelf - tag files on disk and find them by tag
#[derive(Parser, Debug)]
#[command(name = "tagshelf", version, about, long_about = None)]
pub struct Cli {
    /// Database file (overrides config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Skip the missing-file check that runs before each command
    #[arg(long, global = true)]
    pub no_reconcile: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add files with tags
    Add(AddArgs),

    /// List files, optionally filtered by tags (all must match)
    #[command(name = "ls")]
    List(ListArgs),

    /// Show a file's tags and related files
    Show(ShowArgs),

    /// Add tags to a file
    Tag(TagArgs),

    /// Remove a tag from a file
    Untag(UntagArgs),

    /// Replace all tags on a file
    Retag(RetagArgs),

    /// Stop tracking a file
    Rm(RmArgs),

    /// Mark a file as accessed now
    Touch(TouchArgs),

    /// List all tags
    Tags(TagsArgs),

    /// Create a tag
    NewTag(NewTagArgs),

    /// Delete a tag from every file
    DeleteTag(DeleteTagArgs),

    /// Change a tag's color
    Color(ColorArgs),

    /// Mark files that no longer exist as Missing
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `add` command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Files (or directories with --recursive) to add
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Tag to apply (can be specified multiple times)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Already tracked file the new files relate to (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub related: Vec<PathBuf>,

    /// Walk directories and add every file inside
    #[arg(short, long)]
    pub recursive: bool,
}

/// Arguments for the `ls` (list) command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Filter by tag (can be specified multiple times)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// File path
    pub path: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tag` command
#[derive(Parser, Debug)]
pub struct TagArgs {
    /// File path
    pub path: PathBuf,

    /// Tags to add
    #[arg(required = true)]
    pub tags: Vec<String>,
}

/// Arguments for the `untag` command
#[derive(Parser, Debug)]
pub struct UntagArgs {
    /// File path
    pub path: PathBuf,

    /// Tag to remove
    pub tag: String,
}

/// Arguments for the `retag` command
#[derive(Parser, Debug)]
pub struct RetagArgs {
    /// File path
    pub path: PathBuf,

    /// New tag (can be specified multiple times; none clears all tags)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug)]
pub struct RmArgs {
    /// File path
    pub path: PathBuf,
}

/// Arguments for the `touch` command
#[derive(Parser, Debug)]
pub struct TouchArgs {
    /// File path
    pub path: PathBuf,
}

/// Arguments for the `tags` command
#[derive(Parser, Debug)]
pub struct TagsArgs {
    /// Show each tag's color
    #[arg(long)]
    pub colors: bool,

    /// Show how many files carry each tag
    #[arg(long)]
    pub counts: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `new-tag` command
#[derive(Parser, Debug)]
pub struct NewTagArgs {
    /// Tag name
    pub name: String,

    /// Color as #RRGGBB (generated if omitted)
    #[arg(long)]
    pub color: Option<String>,
}

/// Arguments for the `delete-tag` command
#[derive(Parser, Debug)]
pub struct DeleteTagArgs {
    /// Tag name
    pub name: String,
}

/// Arguments for the `color` command
#[derive(Parser, Debug)]
pub struct ColorArgs {
    /// Tag name
    pub name: String,

    /// New color as #RRGGBB
    pub color: String,
}

/// Arguments for the `check` command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Report what would change without updating any tags
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
