use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use snafu::{ResultExt, Snafu};

use crate::flow::{PortProtocol, UNTAGGED};
use crate::internal_events::{emit, FlowLineSkipped, FlowLogFailed, FlowLogProcessed};
use crate::lookup::LookupTable;

/// Fatal, file-level failures while scanning a flow log. Malformed lines are
/// skipped with a warning and never abort the run.
#[derive(Debug, Snafu)]
pub enum ProcessError {
    #[snafu(display("flow log {} could not be opened: {}", path.display(), source))]
    Open { path: PathBuf, source: io::Error },

    #[snafu(display("flow log {} could not be read: {}", path.display(), source))]
    Read { path: PathBuf, source: io::Error },
}

/// Aggregates produced by one pass over a flow log.
///
/// Both maps start empty on every [`FlowLogProcessor::process`] call; nothing
/// carries over between runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowSummary {
    /// Occurrences per tag, in first-seen order. Every well-formed record
    /// lands in exactly one bucket, with [`UNTAGGED`] as the fallback.
    pub tag_counts: IndexMap<String, u64>,
    /// Occurrences per (port, protocol) key, restricted to keys the lookup
    /// table maps to a tag other than [`UNTAGGED`].
    pub combination_counts: BTreeMap<PortProtocol, u64>,
}

/// Scans a flow log line by line and classifies each record against a lookup
/// table.
#[derive(Debug)]
pub struct FlowLogProcessor<'a> {
    lookup: &'a LookupTable,
}

impl<'a> FlowLogProcessor<'a> {
    pub fn new(lookup: &'a LookupTable) -> Self {
        Self { lookup }
    }

    /// Processes the flow log at `path`. Open and read failures are fatal
    /// and logged before being returned; malformed lines are skipped with a
    /// warning naming the line.
    pub fn process(&self, path: &Path) -> Result<FlowSummary, ProcessError> {
        let result = self.process_path(path);
        if let Err(error) = &result {
            emit(FlowLogFailed { path, error });
        }
        result
    }

    fn process_path(&self, path: &Path) -> Result<FlowSummary, ProcessError> {
        let file = File::open(path).context(OpenSnafu { path })?;
        self.process_reader(BufReader::new(file), path)
    }

    /// Reader-based entry point behind [`Self::process`]. Read failures are
    /// reported against `origin`.
    pub fn process_reader<R: BufRead>(
        &self,
        reader: R,
        origin: &Path,
    ) -> Result<FlowSummary, ProcessError> {
        let tagged = self.lookup.tagged_keys();

        let mut summary = FlowSummary::default();
        let mut records = 0_u64;
        let mut skipped = 0_u64;

        for (index, line) in reader.lines().enumerate() {
            let line = line.context(ReadSnafu { path: origin })?;

            let (port, protocol) = match parse_line(&line) {
                Some(parsed) => parsed,
                None => {
                    skipped += 1;
                    emit(FlowLineSkipped {
                        line: line.trim(),
                        number: index as u64 + 1,
                    });
                    continue;
                }
            };

            let key = PortProtocol::new(port, protocol);
            let tag = self.lookup.get(&key).unwrap_or(UNTAGGED);

            if tag != UNTAGGED && tagged.contains(&key) {
                *summary.combination_counts.entry(key).or_insert(0) += 1;
            }

            *summary.tag_counts.entry(tag.to_owned()).or_insert(0) += 1;
            records += 1;
        }

        emit(FlowLogProcessed {
            path: origin,
            records,
            skipped,
        });

        Ok(summary)
    }
}

/// A well-formed line is exactly two whitespace-separated tokens with an
/// integer destination port.
fn parse_line(line: &str) -> Option<(u32, &str)> {
    let mut tokens = line.split_whitespace();
    let port = tokens.next()?;
    let protocol = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    Some((port.parse().ok()?, protocol))
}
