//! Tag command handlers (tags, new-tag, delete-tag, color).

use anyhow::{Context, Result, bail};

use crate::cli::output::{OutputFormat, TagListing, print_json};
use crate::cli::{ColorArgs, DeleteTagArgs, NewTagArgs, TagsArgs};
use crate::domain::{Color, Tag};
use crate::service::TagService;

pub fn handle_tags(args: &TagsArgs, service: &TagService<'_>) -> Result<()> {
    let rows: Vec<(Tag, Option<u32>)> = if args.counts {
        service
            .tag_counts()?
            .into_iter()
            .map(|c| (c.tag, Some(c.count)))
            .collect()
    } else {
        service
            .all_tags_with_colors()?
            .into_values()
            .map(|tag| (tag, None))
            .collect()
    };

    match args.format {
        OutputFormat::Human => {
            if rows.is_empty() {
                println!("No tags found.");
            }
            for (tag, count) in &rows {
                let mut line = tag.name().to_string();
                if args.colors {
                    line.push_str(&format!("  {}", tag.stored_color()));
                }
                if let Some(count) = count {
                    line.push_str(&format!(" ({})", count));
                }
                if tag.is_system() {
                    line.push_str("  [system]");
                }
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let listings: Vec<TagListing> = rows
                .iter()
                .map(|(tag, count)| TagListing {
                    name: tag.name().to_string(),
                    system: tag.is_system(),
                    color: args.colors.then(|| tag.stored_color()),
                    count: *count,
                })
                .collect();
            print_json(listings)?;
        }
        OutputFormat::Paths => {
            for (tag, _) in &rows {
                println!("{}", tag.name());
            }
        }
    }
    Ok(())
}

pub fn handle_new_tag(args: &NewTagArgs, service: &TagService<'_>) -> Result<()> {
    let color = args
        .color
        .as_deref()
        .map(|hex| {
            hex.parse::<Color>()
                .with_context(|| format!("invalid color for tag '{}'", args.name))
        })
        .transpose()?;

    let tag = service.add_tag(&args.name, color)?;
    println!("Tag: {} {}", tag.name(), tag.stored_color());
    Ok(())
}

pub fn handle_delete_tag(args: &DeleteTagArgs, service: &TagService<'_>) -> Result<()> {
    if !service.delete_tag(&args.name)? {
        bail!("tag not found: {}", args.name);
    }
    println!("Deleted tag: {}", args.name);
    Ok(())
}

pub fn handle_color(args: &ColorArgs, service: &TagService<'_>) -> Result<()> {
    let tag = service.update_tag_color(&args.name, &args.color)?;
    println!("Tag: {} {}", tag.name(), tag.stored_color());
    Ok(())
}
