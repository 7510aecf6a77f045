//! Drop command implementation

use crate::cli::EntryArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &EntryArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let handle = add_archive_context(ziptools_core::open(&args.archive, false), &args.archive)?;
    let removed = add_archive_context(handle.drop_entry(&args.name), &args.archive)?;
    add_archive_context(handle.close(), &args.archive)?;
    let name = ziptools_core::normalize(&args.name);

    if removed {
        formatter.format_success(
            "drop",
            &format!("Removed '{name}' from {}", args.archive.display()),
        );
    } else {
        formatter.format_warning(&format!("No entry '{name}' in {}", args.archive.display()));
    }
    Ok(())
}
