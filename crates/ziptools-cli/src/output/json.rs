//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::format_time;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::io::{self};
use std::time::SystemTime;
use ziptools_core::Content;
use ziptools_core::ContentKind;
use ziptools_core::EntryStat;
use ziptools_core::Feature;
use ziptools_core::FeatureSet;

pub struct JsonFormatter;

#[derive(Serialize)]
struct StatOutput {
    name: String,
    index: usize,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    compressed_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified_unix: Option<u64>,
}

impl From<&EntryStat> for StatOutput {
    fn from(stat: &EntryStat) -> Self {
        Self {
            name: stat.name.clone(),
            index: stat.index,
            size: stat.size,
            compressed_size: stat.compressed_size,
            modified: stat.modified.map(format_time),
            modified_unix: stat
                .modified
                .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_entries(&self, names: &BTreeSet<String>) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            total_entries: usize,
            entries: &'a BTreeSet<String>,
        }

        let output = JsonOutput::success(
            "list",
            ListOutput {
                total_entries: names.len(),
                entries: names,
            },
        );
        Self::output(&output)
    }

    fn format_entries_long(&self, stats: &[EntryStat], _human_readable: bool) -> Result<()> {
        #[derive(Serialize)]
        struct ListLongOutput {
            total_entries: usize,
            total_size: u64,
            entries: Vec<StatOutput>,
        }

        let data = ListLongOutput {
            total_entries: stats.len(),
            total_size: stats.iter().map(|s| s.size).sum(),
            entries: stats.iter().map(StatOutput::from).collect(),
        };
        Self::output(&JsonOutput::success("list", data))
    }

    fn format_content(&self, name: &str, content: &Content) -> Result<()> {
        #[derive(Serialize)]
        struct ContentOutput<'a> {
            name: &'a str,
            kind: String,
            size: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            bytes: Option<&'a [u8]>,
        }

        // Text that is not valid UTF-8 falls back to the byte array.
        let text = match content.kind {
            ContentKind::Text => content.as_text(),
            ContentKind::Binary => None,
        };
        let data = ContentOutput {
            name,
            kind: content.kind.to_string(),
            size: content.len(),
            text,
            bytes: text.is_none().then_some(content.bytes.as_slice()),
        };
        Self::output(&JsonOutput::success("get", data))
    }

    fn format_stat(&self, stat: &EntryStat) -> Result<()> {
        Self::output(&JsonOutput::success("stat", StatOutput::from(stat)))
    }

    fn format_exists(&self, name: &str, present: bool) -> Result<()> {
        #[derive(Serialize)]
        struct ExistsOutput<'a> {
            name: &'a str,
            exists: bool,
        }

        Self::output(&JsonOutput::success(
            "exists",
            ExistsOutput {
                name,
                exists: present,
            },
        ))
    }

    fn format_features(&self, features: FeatureSet) -> Result<()> {
        #[derive(Serialize)]
        struct FeaturesOutput {
            extra: bool,
            comment: bool,
            compression: bool,
        }

        let data = FeaturesOutput {
            extra: features.contains(Feature::Extra),
            comment: features.contains(Feature::Comment),
            compression: features.contains(Feature::Compression),
        };
        Self::output(&JsonOutput::success("features", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, operation: &str, message: &str) {
        #[derive(Serialize)]
        struct SuccessData {
            message: String,
        }

        let output = JsonOutput::success(
            operation,
            SuccessData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
