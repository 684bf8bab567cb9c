//! Delimiter-separated table export.
//!
//! Turns a header sequence and a flat cell sequence into CSV or TSV text:
//! a UTF-8 byte-order mark, the header row, then data rows of a fixed
//! column count, every row terminated by CRLF. Fields are written as-is
//! and never quoted.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use log::{info, warn};
use thiserror::Error;

/// UTF-8 byte-order mark written ahead of the table.
pub const BOM: &[u8] = "\u{feff}".as_bytes();

/// Base name of exported files.
const FILE_STEM: &str = "data";

/// Row terminator, also written alone for a row holding one empty field.
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not encode table: {0}")]
    Encode(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not flush table: {0}")]
    Flush(#[source] io::Error),
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Csv,
    Tsv,
}

impl Format {
    pub const fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// File name an export in this format is written to.
    pub fn file_name(self) -> String {
        format!("{FILE_STEM}.{}", self.extension())
    }
}

/// Render a table as delimiter-separated bytes.
///
/// `headers` form a single row. `cells` are grouped into rows of
/// `column_count` values; a trailing group shorter than that is dropped.
/// With no headers or a zero column count only the byte-order mark is
/// produced for the missing part.
pub fn render_table<H, C>(
    headers: &[H],
    cells: &[C],
    column_count: usize,
    delimiter: u8,
) -> Result<Vec<u8>, ExportError>
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Never)
        .has_headers(false)
        .flexible(true)
        .from_writer(BOM.to_vec());

    if !headers.is_empty() {
        write_row(&mut writer, headers)?;
    }

    if column_count > 0 {
        let rows = cells.chunks_exact(column_count);
        let dropped = rows.remainder().len();
        for row in rows {
            write_row(&mut writer, row)?;
        }
        if dropped > 0 {
            warn!("dropping {dropped} trailing cells that do not fill a row of {column_count}");
        }
    } else if !cells.is_empty() {
        warn!("no columns to group {} cells into", cells.len());
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.into_error()))
}

/// Write one record. The csv writer quotes a lone empty field so the row
/// is not blank; here that row is written as a bare terminator instead.
fn write_row<S: AsRef<str>>(
    writer: &mut Writer<Vec<u8>>,
    fields: &[S],
) -> Result<(), ExportError> {
    if let [field] = fields {
        if AsRef::<str>::as_ref(field).is_empty() {
            writer.flush().map_err(ExportError::Flush)?;
            writer.get_mut().write_all(CRLF).map_err(ExportError::Flush)?;
            return Ok(());
        }
    }
    writer.write_record(fields.iter().map(|f| AsRef::<str>::as_ref(f)))?;
    Ok(())
}

/// Write the table to `dir/data.<ext>` and return the file path.
///
/// Data rows take their column count from the header row.
pub fn export_table<H, C>(
    dir: &Path,
    headers: &[H],
    cells: &[C],
    format: Format,
) -> Result<PathBuf, ExportError>
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let bytes = render_table(headers, cells, headers.len(), format.delimiter())?;
    let path = dir.join(format.file_name());
    fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!("exported {} rows to {}", cells.len() / headers.len().max(1), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: Vec<u8>) -> String {
        let body = bytes.strip_prefix(BOM).expect("starts with BOM");
        String::from_utf8(body.to_vec()).expect("utf-8")
    }

    #[test]
    fn test_format_properties() {
        assert_eq!(Format::Csv.delimiter(), b',');
        assert_eq!(Format::Tsv.delimiter(), b'\t');
        assert_eq!(Format::Csv.file_name(), "data.csv");
        assert_eq!(Format::Tsv.file_name(), "data.tsv");
    }

    #[test]
    fn test_csv_rows_are_crlf_terminated() {
        let bytes = render_table(&["a", "b"], &["1", "2", "3", "4"], 2, b',').expect("render");
        assert_eq!(text(bytes), "a,b\r\n1,2\r\n3,4\r\n");
    }

    #[test]
    fn test_tsv_delimiter() {
        let bytes = render_table(&["id", "state"], &["#0", "floating"], 2, b'\t').expect("render");
        assert_eq!(text(bytes), "id\tstate\r\n#0\tfloating\r\n");
    }

    #[test]
    fn test_incomplete_row_is_dropped() {
        let bytes = render_table(&["a", "b"], &["1", "2", "3"], 2, b',').expect("render");
        assert_eq!(text(bytes), "a,b\r\n1,2\r\n");
    }

    #[test]
    fn test_fields_are_never_quoted() {
        let bytes = render_table(&["name"], &["x,y", "say \"hi\""], 1, b',').expect("render");
        assert_eq!(text(bytes), "name\r\nx,y\r\nsay \"hi\"\r\n");
    }

    #[test]
    fn test_lone_empty_field_is_a_blank_row() {
        let bytes = render_table(&["name"], &["", "x", ""], 1, b',').expect("render");
        assert_eq!(text(bytes), "name\r\n\r\nx\r\n\r\n");

        let bytes = render_table(&[""], &["a"], 1, b'\t').expect("render");
        assert_eq!(text(bytes), "\r\na\r\n");
    }

    #[test]
    fn test_empty_fields_among_others_stay_bare() {
        let bytes = render_table(&["a", "b"], &["", "", "1", ""], 2, b',').expect("render");
        assert_eq!(text(bytes), "a,b\r\n,\r\n1,\r\n");
    }

    #[test]
    fn test_empty_table_is_only_bom() {
        let empty: [&str; 0] = [];
        let bytes = render_table(&empty, &["1", "2"], 0, b',').expect("render");
        assert_eq!(bytes, BOM);
    }

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = export_table(
            dir.path(),
            &["id", "alpha"],
            &["#0".to_string(), "0.25".to_string()],
            Format::Tsv,
        )
        .expect("export");

        assert_eq!(path, dir.path().join("data.tsv"));
        let written = fs::read(&path).expect("read back");
        assert_eq!(text(written), "id\talpha\r\n#0\t0.25\r\n");
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent");
        let err = export_table(&missing, &["a"], &["1"], Format::Csv).expect_err("no dir");
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
