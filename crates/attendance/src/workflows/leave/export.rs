use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::LeaveRecord;

pub const HEADER: [&str; 4] = ["Empleado", "Tipo", "Fecha", "Justificación"];
/// Suggested column widths in characters, in header order.
pub const COLUMN_WIDTHS: [u16; 4] = [20, 10, 15, 50];

const FILE_PREFIX: &str = "registros_incapacidades";
const FILE_EXTENSION: &str = "csv";
/// Lets spreadsheet applications detect UTF-8 (`Justificación`, `Pérez`).
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported row, already in display form. Fields serialize in
/// [`HEADER`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub employee: String,
    pub kind: &'static str,
    pub date: String,
    pub justification: String,
}

impl ExportRow {
    fn from_record(record: &LeaveRecord) -> Self {
        Self {
            employee: record.employee_name().to_string(),
            kind: record.kind().label(),
            date: display_date(record.date()),
            justification: record.justification().to_string(),
        }
    }
}

/// Single-sheet tabular document ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub header: [&'static str; 4],
    pub column_widths: [u16; 4],
    pub rows: Vec<ExportRow>,
}

impl ExportDocument {
    /// Header plus one row per record.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// UTF-8 CSV prefixed with a byte-order mark; the header row comes from
    /// `self.header`.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(UTF8_BOM.to_vec());
        writer.write_record(self.header)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|err| ExportError::Io(err.into_error()))
    }

    /// Writes the CSV rendering into `directory` under the suggested name.
    pub fn write_to(&self, directory: &Path, exported_on: NaiveDate) -> Result<PathBuf, ExportError> {
        let bytes = self.to_csv()?;
        fs::create_dir_all(directory)?;
        let path = directory.join(suggested_file_name(exported_on));
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Builds the export document; an empty collection has nothing to export.
pub fn export(records: &[LeaveRecord]) -> Result<ExportDocument, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(ExportDocument {
        header: HEADER,
        column_widths: COLUMN_WIDTHS,
        rows: records.iter().map(ExportRow::from_record).collect(),
    })
}

pub fn suggested_file_name(exported_on: NaiveDate) -> String {
    format!(
        "{FILE_PREFIX}_{}.{FILE_EXTENSION}",
        exported_on.format("%Y-%m-%d")
    )
}

/// es-MX short date: day/month/year without padding.
pub fn display_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No hay registros para exportar")]
    Empty,
    #[error("Error al generar el archivo: {0}")]
    Csv(#[from] csv::Error),
    #[error("Error al escribir el archivo: {0}")]
    Io(#[from] io::Error),
}
