use csv::StringRecord;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum DatasetError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    MissingColumn { column: &'static str },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to open dataset {}: {}", path.display(), source)
            }
            DatasetError::Csv(err) => write!(f, "invalid dataset CSV: {}", err),
            DatasetError::MissingColumn { column } => {
                write!(f, "dataset is missing the '{}' column", column)
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Csv(err) => Some(err),
            DatasetError::MissingColumn { .. } => None,
        }
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(crate) fn open(path: &Path) -> Result<std::fs::File, DatasetError> {
    std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Header lookup that tolerates a byte-order mark on the first column.
pub(crate) fn column_index(headers: &StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}') == column)
}

pub(crate) fn require_column(
    headers: &StringRecord,
    column: &'static str,
) -> Result<usize, DatasetError> {
    column_index(headers, column).ok_or(DatasetError::MissingColumn { column })
}

/// Parse a numeric cell; blanks and garbage read as missing, like NaN.
pub(crate) fn numeric_cell(record: &StringRecord, index: usize) -> Option<f64> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
