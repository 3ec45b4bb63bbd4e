//! Check command handler.

use anyhow::{Result, bail};

use crate::cli::CheckArgs;
use crate::cli::output::{OutputFormat, print_json};
use crate::service::TagService;

pub fn handle_check(args: &CheckArgs, service: &TagService<'_>) -> Result<()> {
    let report = if args.dry_run {
        service.scan_missing()?
    } else {
        service.check_missing()?
    };

    match args.format {
        OutputFormat::Human => {
            let (missing, found) = if args.dry_run {
                ("would mark missing", "would restore")
            } else {
                ("missing", "found")
            };
            for path in &report.marked_missing {
                println!("{}: {}", missing, path.display());
            }
            for path in &report.restored {
                println!("{}: {}", found, path.display());
            }
            for failure in &report.failures {
                eprintln!("error: {}: {}", failure.path.display(), failure.error);
            }

            if report.is_clean() {
                println!("All {} file(s) OK.", report.checked);
            } else {
                println!(
                    "\nChecked {} file(s): {} missing, {} restored, {} failed",
                    report.checked,
                    report.marked_missing.len(),
                    report.restored.len(),
                    report.failures.len()
                );
            }
        }
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Paths => {
            for path in &report.marked_missing {
                println!("{}", path.display());
            }
        }
    }

    if !report.failures.is_empty() {
        bail!("check failed for {} file(s)", report.failures.len());
    }
    Ok(())
}
