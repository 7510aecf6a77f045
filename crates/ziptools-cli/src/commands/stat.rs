//! Stat command implementation

use crate::cli::EntryArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;

pub fn execute(args: &EntryArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let handle = add_archive_context(ziptools_core::open(&args.archive, false), &args.archive)?;
    let stat = add_archive_context(handle.stat(&args.name), &args.archive)?;
    add_archive_context(handle.close(), &args.archive)?;

    let Some(stat) = stat else {
        bail!(
            "Entry '{}' not found in '{}'",
            args.name,
            args.archive.display()
        );
    };
    formatter.format_stat(&stat)
}
