//! Make command implementation

use crate::cli::MakeArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use ziptools_core::ZipBackendConfig;

pub fn execute(
    args: &MakeArgs,
    config: ZipBackendConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let handle = add_archive_context(
        ziptools_core::create_exclusive_with_config(&args.archive, config),
        &args.archive,
    )?;
    add_archive_context(handle.close(), &args.archive)?;

    formatter.format_success(
        "make",
        &format!("Created empty archive {}", handle.path().display()),
    );
    Ok(())
}
