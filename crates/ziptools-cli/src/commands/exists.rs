//! Exists command implementation

use crate::cli::EntryArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;

/// Returns whether the entry exists; the caller maps this to the exit status.
pub fn execute(args: &EntryArgs, formatter: &dyn OutputFormatter) -> Result<bool> {
    let handle = add_archive_context(ziptools_core::open(&args.archive, false), &args.archive)?;
    let present = add_archive_context(handle.exists(&args.name), &args.archive)?;
    add_archive_context(handle.close(), &args.archive)?;

    formatter.format_exists(&args.name, present)?;
    Ok(present)
}
