//! Features command implementation

use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(formatter: &dyn OutputFormatter) -> Result<()> {
    formatter.format_features(ziptools_core::features())
}
