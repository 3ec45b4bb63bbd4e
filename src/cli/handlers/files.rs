//! File command handlers (add, ls, show, tag, untag, retag, rm, touch).

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::WalkDir;

use super::{format_tags, resolve_path, truncate_str};
use crate::cli::output::{FileListing, OutputFormat, print_json};
use crate::cli::{AddArgs, ListArgs, RetagArgs, RmArgs, ShowArgs, TagArgs, TouchArgs, UntagArgs};
use crate::domain::TaggedFile;
use crate::service::{ErrorCategory, TagService};

pub fn handle_add(args: &AddArgs, service: &TagService<'_>) -> Result<()> {
    let targets = collect_targets(&args.paths, args.recursive)?;
    let related = args
        .related
        .iter()
        .map(|p| resolve_path(p))
        .collect::<Result<Vec<_>>>()?;
    let existing: HashSet<String> = service.all_tags()?.into_iter().collect();

    let mut added = 0usize;
    let mut skipped = 0usize;
    for path in &targets {
        let file = related.iter().fold(
            TaggedFile::from_path(path).with_tags(args.tags.iter().cloned()),
            |file, r| file.with_related(r.clone()),
        );

        match service.add_file(&file, &existing) {
            Ok(()) => {
                println!("Added: {}", path.display());
                added += 1;
            }
            Err(err) if args.recursive && err.category == ErrorCategory::DuplicateFile => {
                println!("Skipped (already added): {}", path.display());
                skipped += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to add {}", path.display()));
            }
        }
    }

    if targets.len() > 1 {
        println!();
        println!("{} file(s) added, {} skipped", added, skipped);
    }
    Ok(())
}

/// Expands the paths given to `add` into the files to store.
pub(crate) fn collect_targets(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    for path in paths {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        let path = resolve_path(path)?;

        if !path.is_dir() {
            targets.push(path);
            continue;
        }
        if !recursive {
            bail!("{} is a directory (use --recursive)", path.display());
        }
        for entry in WalkDir::new(&path).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("failed to walk directory: {}", path.display()))?;
            if entry.file_type().is_file() {
                targets.push(entry.into_path());
            }
        }
    }
    let mut seen = HashSet::new();
    targets.retain(|p| seen.insert(p.clone()));
    Ok(targets)
}

pub fn handle_list(args: &ListArgs, service: &TagService<'_>) -> Result<()> {
    let files = service.files_by_tags(&args.tags)?;

    match args.format {
        OutputFormat::Human => {
            if files.is_empty() {
                println!("No files found.");
            } else {
                println!("{:<10}  {:<30}  {}", "Accessed", "Tags", "Path");
                println!(
                    "{:<10}  {:<30}  {}",
                    "----------", "------------------------------", "----"
                );

                for file in &files {
                    let accessed = file.last_accessed_at().format("%Y-%m-%d").to_string();
                    let tags = truncate_str(&format_tags(file.tags()), 30);
                    println!("{:<10}  {:<30}  {}", accessed, tags, file.path().display());
                }

                println!();
                println!("{} file(s)", files.len());
            }
        }
        OutputFormat::Json => {
            let listings: Vec<FileListing> = files.iter().map(FileListing::from).collect();
            print_json(listings)?;
        }
        OutputFormat::Paths => {
            for file in &files {
                println!("{}", file.path().display());
            }
        }
    }
    Ok(())
}

pub fn handle_show(args: &ShowArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    let file = service.get_file(&path)?;

    match args.format {
        OutputFormat::Human => {
            println!("# {}", file.name());
            println!();
            println!("Path: {}", file.path().display());
            println!("Tags: {}", format_tags(file.tags()));
            println!(
                "Created: {}  Last accessed: {}",
                file.created_at().format("%Y-%m-%d %H:%M"),
                file.last_accessed_at().format("%Y-%m-%d %H:%M")
            );

            if !file.related_paths().is_empty() {
                println!();
                println!("Related:");
                for related in file.related_paths() {
                    println!("  {}", related.display());
                }
            }
        }
        OutputFormat::Json => print_json(FileListing::from(&file))?,
        OutputFormat::Paths => {
            println!("{}", file.path().display());
            for related in file.related_paths() {
                println!("{}", related.display());
            }
        }
    }
    Ok(())
}

pub fn handle_tag(args: &TagArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    let file = service.tag_file(&path, args.tags.iter().cloned())?;
    println!("Tagged {}: {}", path.display(), format_tags(file.tags()));
    Ok(())
}

pub fn handle_untag(args: &UntagArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    if service.delete_tag_from_file(&path, &args.tag)? {
        println!("Removed tag '{}' from {}", args.tag, path.display());
    } else {
        println!("{} does not have tag '{}'", path.display(), args.tag);
    }
    Ok(())
}

pub fn handle_retag(args: &RetagArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    let file = service.retag_file(&path, args.tags.iter().cloned())?;
    println!("Tagged {}: {}", path.display(), format_tags(file.tags()));
    Ok(())
}

pub fn handle_rm(args: &RmArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    if !service.delete_file(&path)? {
        bail!("file is not tracked: {}", path.display());
    }
    println!("Removed: {}", path.display());
    Ok(())
}

pub fn handle_touch(args: &TouchArgs, service: &TagService<'_>) -> Result<()> {
    let path = resolve_path(&args.path)?;
    service.touch_file(&path)?;
    println!("Touched: {}", path.display());
    Ok(())
}
