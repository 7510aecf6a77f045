//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::ArgGroup;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ziptools")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (repeat for debug logging)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Deflate level (1-9) for entries written by this invocation
    #[arg(short = 'l', long, global = true, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List archive entries
    List(ListArgs),
    /// Print the content of an entry
    Get(GetArgs),
    /// Add an entry, replacing any entry of the same name
    Add(AddArgs),
    /// Delete an entry
    Drop(EntryArgs),
    /// Exit with status 0 if an entry exists, 1 otherwise
    Exists(EntryArgs),
    /// Show entry metadata
    Stat(EntryArgs),
    /// Create a new, empty archive (fails if the file exists)
    Make(MakeArgs),
    /// Show the optional capabilities of the archive backend
    Features,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show size and modification time of each entry
    #[arg(long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct EntryArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entry name (a leading "./" is ignored)
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Treat the content as text
    #[arg(long, conflicts_with = "binary")]
    pub text: bool,

    /// Treat the content as binary
    #[arg(long)]
    pub binary: bool,

    /// Write the content to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "value"])))]
pub struct AddArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Read the content from PATH
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Use TEXT as the content
    #[arg(long, value_name = "TEXT")]
    pub value: Option<String>,

    /// Attach a comment to the entry
    #[arg(long, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Store the entry without compression
    #[arg(long)]
    pub store: bool,

    /// Create the archive if it does not exist
    #[arg(short, long)]
    pub create: bool,
}

#[derive(clap::Args)]
pub struct MakeArgs {
    /// Path of the archive to create
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}
