//! Writing scraped records and page snapshots to disk.

use std::fs;
use std::path::Path;

use csv::{Terminator, Writer, WriterBuilder};

use crate::error::SinkError;
use crate::models::CsvRecord;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create the parent directory of `path` if it has one.
fn ensure_parent(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_error(parent))
        }
        _ => Ok(()),
    }
}

/// Header row followed by one row per record.
fn write_records<W: std::io::Write, R: CsvRecord>(
    mut writer: Writer<W>,
    records: &[R],
) -> Result<W, SinkError> {
    writer.write_record(R::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| SinkError::Csv(csv::Error::from(e.into_error())))
}

fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    // The header row comes from `CsvRecord::HEADERS` so it is written even
    // when there are no records.
    builder.has_headers(false).terminator(Terminator::Any(b'\n'));
    builder
}

/// Render records as CSV text.
pub fn to_csv_string<R: CsvRecord>(records: &[R]) -> Result<String, SinkError> {
    let bytes = write_records(builder().from_writer(Vec::new()), records)?;
    // csv only emits the UTF-8 it is given.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write records to `path`, replacing any existing file.
pub fn write_csv<R: CsvRecord>(path: &Path, records: &[R]) -> Result<(), SinkError> {
    ensure_parent(path)?;
    let file = fs::File::create(path).map_err(io_error(path))?;
    write_records(builder().from_writer(file), records)?;
    Ok(())
}

/// Save the revealed page markup so extraction can be rerun offline.
pub fn save_snapshot(path: &Path, html: &str) -> Result<(), SinkError> {
    ensure_parent(path)?;
    fs::write(path, html).map_err(io_error(path))
}

/// Read a previously saved page snapshot.
pub fn load_snapshot(path: &Path) -> Result<String, SinkError> {
    fs::read_to_string(path).map_err(io_error(path))
}
