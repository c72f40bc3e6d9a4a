use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};

use crate::internal_events::{emit, ReportWriteFailed, ReportWritten};
use crate::processor::FlowSummary;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("report {} could not be created: {}", path.display(), source))]
    Create { path: PathBuf, source: io::Error },

    #[snafu(display("report {} could not be written: {}", path.display(), source))]
    Write { path: PathBuf, source: io::Error },
}

/// Writes a [`FlowSummary`] to a file as the two-section tab-separated
/// report.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes the report, truncating any previous file at the destination.
    ///
    /// Create and write failures are fatal and logged before being returned.
    /// A failure mid-write can leave a partial file behind.
    pub fn write(&self, summary: &FlowSummary) -> Result<(), ReportError> {
        let result = self.write_file(summary);
        match &result {
            Ok(()) => emit(ReportWritten { path: &self.path }),
            Err(error) => emit(ReportWriteFailed {
                path: &self.path,
                error,
            }),
        }
        result
    }

    fn write_file(&self, summary: &FlowSummary) -> Result<(), ReportError> {
        let file = File::create(&self.path).context(CreateSnafu { path: &self.path })?;
        let mut writer = BufWriter::new(file);

        write_to(&mut writer, summary).context(WriteSnafu { path: &self.path })?;
        writer.flush().context(WriteSnafu { path: &self.path })
    }
}

/// Renders the report into `writer`.
///
/// Tags are sorted by count descending; the sort is stable, so tags with
/// equal counts keep the order they were first seen in. The combination
/// section follows the key's natural (port, protocol) order.
pub fn write_to<W: Write>(writer: &mut W, summary: &FlowSummary) -> io::Result<()> {
    let mut tags: Vec<_> = summary.tag_counts.iter().collect();
    tags.sort_by(|left, right| right.1.cmp(left.1));

    writeln!(writer, "Tag Counts:")?;
    writeln!(writer, "Tag\t\tCount")?;
    for (tag, count) in tags {
        writeln!(writer, "{tag}\t\t{count}")?;
    }

    writeln!(writer)?;
    writeln!(writer, "Port/Protocol Combination Counts:")?;
    writeln!(writer, "Port\tProtocol\tCount")?;
    for (key, count) in &summary.combination_counts {
        writeln!(writer, "{}\t{}\t{count}", key.port(), key.protocol())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use indexmap::IndexMap;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::flow::{PortProtocol, UNTAGGED};

    fn render(summary: &FlowSummary) -> String {
        let mut rendered = Vec::new();
        write_to(&mut rendered, summary).unwrap();
        String::from_utf8(rendered).unwrap()
    }

    #[test]
    fn renders_both_sections() {
        let summary = FlowSummary {
            tag_counts: IndexMap::from([
                ("sv_p1".to_owned(), 2),
                (UNTAGGED.to_owned(), 1),
            ]),
            combination_counts: BTreeMap::from([(PortProtocol::new(25, "tcp"), 2)]),
        };

        assert_eq!(
            render(&summary),
            "Tag Counts:\n\
             Tag\t\tCount\n\
             sv_p1\t\t2\n\
             untagged\t\t1\n\
             \n\
             Port/Protocol Combination Counts:\n\
             Port\tProtocol\tCount\n\
             25\ttcp\t2\n"
        );
    }

    #[test]
    fn tags_sort_by_descending_count() {
        let summary = FlowSummary {
            tag_counts: IndexMap::from([
                ("low".to_owned(), 1),
                ("high".to_owned(), 9),
                ("mid".to_owned(), 4),
            ]),
            combination_counts: BTreeMap::new(),
        };

        assert_eq!(
            render(&summary),
            "Tag Counts:\n\
             Tag\t\tCount\n\
             high\t\t9\n\
             mid\t\t4\n\
             low\t\t1\n\
             \n\
             Port/Protocol Combination Counts:\n\
             Port\tProtocol\tCount\n"
        );
    }

    #[test]
    fn tied_tags_keep_first_seen_order() {
        let summary = FlowSummary {
            tag_counts: IndexMap::from([
                ("second".to_owned(), 2),
                ("first".to_owned(), 2),
                ("top".to_owned(), 5),
            ]),
            combination_counts: BTreeMap::new(),
        };

        let rendered = render(&summary);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(&lines[2..5], &["top\t\t5", "second\t\t2", "first\t\t2"]);
    }

    #[test]
    fn combinations_sort_by_port_then_protocol() {
        let summary = FlowSummary {
            tag_counts: IndexMap::new(),
            combination_counts: BTreeMap::from([
                (PortProtocol::new(443, "tcp"), 1),
                (PortProtocol::new(25, "udp"), 3),
                (PortProtocol::new(25, "tcp"), 2),
            ]),
        };

        let rendered = render(&summary);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(
            &lines[5..8],
            &["25\ttcp\t2", "25\tudp\t3", "443\ttcp\t1"]
        );
    }

    #[test]
    fn writes_and_overwrites_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(&path, "stale contents").unwrap();

        let summary = FlowSummary {
            tag_counts: IndexMap::from([("sv_p1".to_owned(), 1)]),
            combination_counts: BTreeMap::new(),
        };
        ReportWriter::new(&path).write(&summary).unwrap();

        let report = fs::read_to_string(&path).unwrap();
        assert!(report.starts_with("Tag Counts:\n"));
        assert!(report.contains("sv_p1\t\t1\n"));
        assert!(!report.contains("stale"));
    }

    #[test]
    fn unwritable_destination_is_fatal_and_names_the_path() {
        let summary = FlowSummary::default();
        let error = ReportWriter::new("does/not/exist/report.txt")
            .write(&summary)
            .unwrap_err();

        assert!(matches!(error, ReportError::Create { .. }));
        assert!(error.to_string().contains("does/not/exist/report.txt"));
    }
}
