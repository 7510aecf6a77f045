//! Output formatter trait for CLI results.

use anyhow::Result;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::SystemTime;
use ziptools_core::Content;
use ziptools_core::EntryStat;
use ziptools_core::FeatureSet;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format entry names, one per line
    fn format_entries(&self, names: &BTreeSet<String>) -> Result<()>;

    /// Format entries with size and modification time
    fn format_entries_long(&self, stats: &[EntryStat], human_readable: bool) -> Result<()>;

    /// Format the content of one entry
    fn format_content(&self, name: &str, content: &Content) -> Result<()>;

    /// Format the metadata of one entry
    fn format_stat(&self, stat: &EntryStat) -> Result<()>;

    /// Format the result of an existence check
    fn format_exists(&self, name: &str, present: bool) -> Result<()>;

    /// Format backend capabilities
    fn format_features(&self, features: FeatureSet) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format success message
    fn format_success(&self, operation: &str, message: &str);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Formats an entry timestamp as RFC 3339 in UTC.
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
