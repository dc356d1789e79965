pub mod models;

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use thiserror::Error;

use models::{EXPORT_HEADER, TrackRecord};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, TableError>;

/// Where a table's rows came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Fetched,
    File(PathBuf),
}

/// The session's dataset. Read-only once built.
#[derive(Debug, Clone)]
pub struct TableStore {
    rows: Vec<TrackRecord>,
    origin: Origin,
}

impl TableStore {
    /// Wrap rows produced by the fetcher.
    pub fn fetched(rows: Vec<TrackRecord>) -> Self {
        Self {
            rows,
            origin: Origin::Fetched,
        }
    }

    /// Load a previously exported CSV file. Extra columns (such as the leading
    /// index) are ignored; every schema column must be present. Only header
    /// names are trimmed, field values are kept as written.
    pub fn load(path: &Path) -> Result<Self> {
        let parse_err = |message: String| TableError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| parse_err(e.to_string()))?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .has_headers(true)
            .from_reader(file);

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for (i, result) in reader.deserialize::<TrackRecord>().enumerate() {
            let record = result.map_err(|e| parse_err(format!("row {}: {e}", i + 1)))?;
            if !seen.insert(record.track_id.clone()) {
                return Err(parse_err(format!(
                    "row {}: duplicate track_id {}",
                    i + 1,
                    record.track_id
                )));
            }
            rows.push(record);
        }

        log::info!("Loaded {} tracks from {}", rows.len(), path.display());
        Ok(Self {
            rows,
            origin: Origin::File(path.to_path_buf()),
        })
    }

    /// Write every row to `path` with a header and a leading 0-based index
    /// column. Overwrites any existing file.
    pub fn export(&self, path: &Path) -> Result<()> {
        let write_err = |message: String| TableError::Write {
            path: path.to_path_buf(),
            message,
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| write_err(e.to_string()))?;

        writer
            .write_record(EXPORT_HEADER)
            .map_err(|e| write_err(e.to_string()))?;
        for (index, row) in self.rows.iter().enumerate() {
            writer
                .write_record(row.to_export_fields(index))
                .map_err(|e| write_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| write_err(e.to_string()))?;

        log::info!("Exported {} tracks to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn rows(&self) -> &[TrackRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_from_file(&self) -> bool {
        matches!(self.origin, Origin::File(_))
    }
}
