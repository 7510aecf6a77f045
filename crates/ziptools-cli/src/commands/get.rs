//! Get command implementation

use crate::cli::GetArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use ziptools_core::ReadMode;

pub fn execute(args: &GetArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = &args.entry.archive;
    let name = args.entry.name.as_str();
    let handle = add_archive_context(ziptools_core::open(archive, false), archive)?;

    let content = add_archive_context(handle.get_entry(name, read_mode(args)), archive)?;
    let Some(content) = content else {
        bail!("Entry '{name}' not found in '{}'", archive.display());
    };
    add_archive_context(handle.close(), archive)?;

    if let Some(output) = &args.output {
        std::fs::write(output, &content.bytes)
            .with_context(|| format!("Failed to write '{}'", output.display()))?;
        formatter.format_success(
            "get",
            &format!(
                "Wrote {} bytes ({}) to {}",
                content.len(),
                content.kind,
                output.display()
            ),
        );
    } else {
        formatter.format_content(name, &content)?;
    }

    Ok(())
}

const fn read_mode(args: &GetArgs) -> ReadMode {
    if args.text {
        ReadMode::Text
    } else if args.binary {
        ReadMode::Binary
    } else {
        ReadMode::Auto
    }
}
