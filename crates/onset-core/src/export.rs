//! Delimited-text renderings of a result set.
//!
//! Every shape starts with a UTF-8 byte-order mark so spreadsheet readers
//! pick the right character set, and quotes every field with embedded
//! quotes doubled. The quick single-page export is comma-delimited; batch
//! exports are semicolon-delimited.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::location::{display_location, extract_triple};
use crate::record::CompanyRecord;
use crate::search::Breadcrumb;

const BOM: &str = "\u{FEFF}";

const SUMMARY_HEADER: [&str; 5] = ["Nome", "Setor", "Localização", "Funcionários", "Site"];

const TABLE_HEADER: [&str; 9] = [
    "Nome",
    "Setor",
    "Cidade",
    "Estado",
    "País",
    "Funcionários (Faixa)",
    "Telefone",
    "Site",
    "LinkedIn",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export blocked: pages {} failed and must be reprocessed first", format_pages(.0))]
    PendingFailedPages(Vec<u32>),

    #[error("no companies to export")]
    Empty,

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read-only view of a finished batch run, handed over for export.
#[derive(Debug, Clone, Default)]
pub struct BatchSnapshot {
    pub records: Vec<CompanyRecord>,
    /// Pages that failed and were not recovered, ascending.
    pub failed_pages: Vec<u32>,
    pub page_from: u32,
    pub page_to: u32,
    /// Breadcrumbs of the search that produced the run.
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl BatchSnapshot {
    /// Rejects snapshots that still carry failed pages or hold no records.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::PendingFailedPages`] or [`ExportError::Empty`].
    pub fn ensure_exportable(&self) -> Result<(), ExportError> {
        if !self.failed_pages.is_empty() {
            return Err(ExportError::PendingFailedPages(self.failed_pages.clone()));
        }
        if self.records.is_empty() {
            return Err(ExportError::Empty);
        }
        Ok(())
    }
}

/// `empresas_export_2025-01-31.csv`
#[must_use]
pub fn quick_filename(date: NaiveDate) -> String {
    format!("empresas_export_{}.csv", date.format("%Y-%m-%d"))
}

/// `empresas_export_lote_3_a_7_2025-01-31.csv`
#[must_use]
pub fn batch_filename(from: u32, to: u32, date: NaiveDate) -> String {
    format!(
        "empresas_export_lote_{from}_a_{to}_{}.csv",
        date.format("%Y-%m-%d")
    )
}

/// Comma-delimited export of one page of results.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty page, or a write error.
pub fn quick_csv(records: &[CompanyRecord]) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    write_table(b',', &SUMMARY_HEADER, records.iter().map(summary_row))
}

/// Semicolon-delimited export of a completed batch run.
///
/// # Errors
///
/// Fails when the snapshot is not exportable, or on a write error.
pub fn batch_csv(snapshot: &BatchSnapshot) -> Result<Vec<u8>, ExportError> {
    snapshot.ensure_exportable()?;
    write_table(b';', &SUMMARY_HEADER, snapshot.records.iter().map(summary_row))
}

/// Semicolon-delimited table with the location split into city, state and
/// country columns, plus contact columns.
///
/// # Errors
///
/// Fails when the snapshot is not exportable, or on a write error.
pub fn enriched_table_csv(snapshot: &BatchSnapshot) -> Result<Vec<u8>, ExportError> {
    snapshot.ensure_exportable()?;
    let rows = snapshot
        .records
        .iter()
        .map(|record| table_row(record, &snapshot.breadcrumbs));
    write_table(b';', &TABLE_HEADER, rows)
}

fn summary_row(record: &CompanyRecord) -> Vec<String> {
    vec![
        record.name().to_string(),
        record.industry().unwrap_or_default().to_string(),
        display_location(record),
        record
            .num_employees()
            .map(|n| n.to_string())
            .unwrap_or_default(),
        record.website_url().unwrap_or_default().to_string(),
    ]
}

fn table_row(record: &CompanyRecord, breadcrumbs: &[Breadcrumb]) -> Vec<String> {
    let triple = extract_triple(record, breadcrumbs);
    vec![
        record.name().to_string(),
        record.industry().unwrap_or_default().to_string(),
        triple.city,
        triple.state,
        triple.country,
        record.num_employees_range().unwrap_or_default().to_string(),
        record.phone().unwrap_or_default().to_string(),
        record.website_url().unwrap_or_default().to_string(),
        record.linkedin_url().unwrap_or_default().to_string(),
    ]
}

fn write_table<I>(delimiter: u8, header: &[&str], rows: I) -> Result<Vec<u8>, ExportError>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BOM.as_bytes().to_vec());

    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
