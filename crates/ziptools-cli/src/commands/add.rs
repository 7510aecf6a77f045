//! Add command implementation

use crate::cli::AddArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use ziptools_core::AddOptions;
use ziptools_core::ZipBackendConfig;

pub fn execute(
    args: &AddArgs,
    config: ZipBackendConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let archive = &args.entry.archive;
    let name = args.entry.name.as_str();

    let content = match (&args.file, &args.value) {
        (Some(path), _) => std::fs::read(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        (None, Some(value)) => value.clone().into_bytes(),
        (None, None) => bail!("Either --file or --value is required"),
    };
    let size = content.len();

    let mut options = AddOptions::new().with_compress(!args.store);
    if let Some(comment) = &args.comment {
        options = options.with_comment(comment.as_bytes());
    }

    let handle = add_archive_context(
        ziptools_core::open_with_config(archive, args.create, config),
        archive,
    )?;
    let replaced = add_archive_context(handle.exists(name), archive)?;
    let index = add_archive_context(handle.add_or_replace(name, content, &options), archive)?;
    add_archive_context(handle.close(), archive)?;

    log::info!("entry '{name}' written at index {index}");
    let verb = if replaced { "Replaced" } else { "Added" };
    formatter.format_success(
        "add",
        &format!(
            "{verb} '{}' ({size} bytes) in {}",
            ziptools_core::normalize(name),
            archive.display()
        ),
    );
    Ok(())
}
