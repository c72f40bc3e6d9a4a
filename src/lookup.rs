use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu};

use crate::flow::{PortProtocol, UNTAGGED};
use crate::internal_events::{emit, LookupLoadFailed, LookupRowSkipped, LookupTableLoaded};

/// Fatal, file-level failures while building a [`LookupTable`].
///
/// Malformed rows are not errors; they are skipped with a warning and the
/// parse continues.
#[derive(Debug, Snafu)]
pub enum LookupError {
    #[snafu(display("lookup table {} could not be opened: {}", path.display(), source))]
    Open { path: PathBuf, source: csv::Error },

    #[snafu(display("lookup table {} could not be read: {}", path.display(), source))]
    Read { path: PathBuf, source: csv::Error },

    #[snafu(display("lookup table {} is empty", path.display()))]
    Empty { path: PathBuf },
}

/// Mapping from (port, protocol) to tag, built once from the lookup CSV and
/// read-only afterward. Duplicate keys resolve by last row wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupTable {
    entries: HashMap<PortProtocol, String>,
}

impl LookupTable {
    /// Loads the table from the CSV file at `path`.
    ///
    /// The first record is the header and is skipped without validation; a
    /// file with no records at all is refused. Open and read failures are
    /// fatal and logged before being returned.
    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let result = Self::load_path(path);
        if let Err(error) = &result {
            emit(LookupLoadFailed { path, error });
        }
        result
    }

    fn load_path(path: &Path) -> Result<Self, LookupError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .context(OpenSnafu { path })?;
        Self::read_records(reader, path)
    }

    /// Builds the table from any reader producing lookup CSV. Read failures
    /// are reported against `origin`.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, LookupError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self::read_records(reader, origin)
    }

    fn read_records<R: Read>(
        mut reader: csv::Reader<R>,
        path: &Path,
    ) -> Result<Self, LookupError> {
        let mut records = reader.records();

        // The header carries no data, but a file without one is an error
        // rather than an empty table.
        records
            .next()
            .transpose()
            .context(ReadSnafu { path })?
            .context(EmptySnafu { path })?;

        let mut entries = HashMap::new();
        let mut skipped = 0_usize;

        for record in records {
            let record = record.context(ReadSnafu { path })?;
            let line = record.position().map_or(0, csv::Position::line);

            match parse_row(&record) {
                Some((key, tag)) => {
                    entries.insert(key, tag);
                }
                None => {
                    skipped += 1;
                    let row = record.iter().collect::<Vec<_>>().join(",");
                    emit(LookupRowSkipped { row: &row, line });
                }
            }
        }

        emit(LookupTableLoaded {
            path,
            entries: entries.len(),
            skipped,
        });

        Ok(Self { entries })
    }

    pub fn get(&self, key: &PortProtocol) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys mapped to any tag other than the [`UNTAGGED`] sentinel. Only
    /// these are eligible for combination counting.
    pub fn tagged_keys(&self) -> HashSet<&PortProtocol> {
        self.entries
            .iter()
            .filter(|(_, tag)| tag.as_str() != UNTAGGED)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortProtocol, &str)> {
        self.entries.iter().map(|(key, tag)| (key, tag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PortProtocol, String)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (PortProtocol, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A well-formed row has exactly three fields with an integer port. The
/// protocol and tag are lowercased; the tag is additionally trimmed, and the
/// port parse tolerates surrounding whitespace.
fn parse_row(record: &csv::StringRecord) -> Option<(PortProtocol, String)> {
    if record.len() != 3 {
        return None;
    }

    let port = record[0].trim().parse().ok()?;
    let tag = record[2].trim().to_lowercase();

    Some((PortProtocol::new(port, &record[1]), tag))
}
