//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::format_time;
use anyhow::Result;
use console::Term;
use console::style;
use std::collections::BTreeSet;
use std::io::Write;
use std::io::{self};
use ziptools_core::Content;
use ziptools_core::EntryStat;
use ziptools_core::Feature;
use ziptools_core::FeatureSet;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn mtime_column(stat: &EntryStat) -> String {
        stat.modified.map_or_else(|| "-".to_string(), format_time)
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_entries(&self, names: &BTreeSet<String>) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for name in names {
            let _ = self.term.write_line(name);
        }

        Ok(())
    }

    fn format_entries_long(&self, stats: &[EntryStat], human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut total_size = 0u64;
        for stat in stats {
            total_size = total_size.saturating_add(stat.size);
            let size_str = if human_readable {
                Self::format_size(stat.size)
            } else {
                stat.size.to_string()
            };

            let _ = self.term.write_line(&format!(
                "{:>10}  {:<20}  {}",
                size_str,
                Self::mtime_column(stat),
                stat.name
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {}",
            Self::format_number(stats.len()),
            Self::format_size(total_size)
        ));

        Ok(())
    }

    fn format_content(&self, name: &str, content: &Content) -> Result<()> {
        if self.verbose {
            let _ = Term::stderr().write_line(&format!(
                "{name}: {} bytes, {}",
                content.len(),
                content.kind
            ));
        }

        // Content goes to stdout byte for byte, even in quiet mode.
        let mut stdout = io::stdout().lock();
        stdout.write_all(&content.bytes)?;
        stdout.flush()?;
        Ok(())
    }

    fn format_stat(&self, stat: &EntryStat) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!("  Name:       {}", stat.name));
        let _ = self.term.write_line(&format!(
            "  Size:       {} ({} bytes)",
            Self::format_size(stat.size),
            stat.size
        ));
        if let Some(compressed) = stat.compressed_size {
            let _ = self.term.write_line(&format!(
                "  Compressed: {}",
                Self::format_size(compressed)
            ));
        }
        let _ = self
            .term
            .write_line(&format!("  Modified:   {}", Self::mtime_column(stat)));
        if self.verbose {
            let _ = self.term.write_line(&format!("  Index:      {}", stat.index));
        }

        Ok(())
    }

    fn format_exists(&self, name: &str, present: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let verdict = match (present, self.use_colors) {
            (true, true) => style("present").green().to_string(),
            (false, true) => style("absent").red().to_string(),
            (true, false) => "present".to_string(),
            (false, false) => "absent".to_string(),
        };
        let _ = self.term.write_line(&format!("{name}: {verdict}"));
        Ok(())
    }

    fn format_features(&self, features: FeatureSet) -> Result<()> {
        for feature in Feature::ALL {
            let mark = if features.contains(feature) {
                "yes"
            } else {
                "no"
            };
            let _ = self.term.write_line(&format!("{:<12} {mark}", feature.name()));
        }
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_success(&self, _operation: &str, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_scaled() {
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_mtime_column_without_time() {
        let stat = EntryStat {
            index: 0,
            name: "a".into(),
            size: 1,
            compressed_size: None,
            modified: None,
        };
        assert_eq!(HumanFormatter::mtime_column(&stat), "-");
    }
}
