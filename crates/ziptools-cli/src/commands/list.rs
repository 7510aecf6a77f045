//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let handle = add_archive_context(ziptools_core::open(&args.archive, false), &args.archive)?;

    if args.long {
        let mut stats = add_archive_context(handle.list_stats(), &args.archive)?;
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        formatter.format_entries_long(&stats, args.human_readable)?;
    } else {
        let names = add_archive_context(handle.list_entries(), &args.archive)?;
        formatter.format_entries(&names)?;
    }

    add_archive_context(handle.close(), &args.archive)?;
    Ok(())
}
