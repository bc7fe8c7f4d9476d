//! Report export - CSV, XLSX and JSON files plus the console summary

use anyhow::{Context, Result};
use colored::Colorize;
use rust_xlsxwriter::{Format, Workbook};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::flight::{ComparisonResult, FlightRecord, Source, COLUMNS};
use crate::log::Logger;
use crate::price::group_thousands;

/// File stem shared by every export of one run
const FILE_STEM: &str = "flight_comparison";

/// Display widths for the console listing
const AIRLINE_WIDTH: usize = 25;
const STOPS_WIDTH: usize = 12;
const TIME_WIDTH: usize = 8;
const PRICE_WIDTH: usize = 12;
const SOURCE_WIDTH: usize = 12;

/// Width of the console banner rules
pub const RULE_WIDTH: usize = 90;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Json => "json",
        }
    }
}

/// What one export attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing to export; no file was created
    NoData,
}

/// Writes the comparison to files named after the run timestamp
pub struct ReportExporter {
    output_dir: PathBuf,
    timestamp: String,
    logger: Logger,
}

impl ReportExporter {
    pub fn new(output_dir: &Path, logger: Logger) -> Self {
        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        Self::with_timestamp(output_dir, &timestamp, logger)
    }

    pub fn with_timestamp(output_dir: &Path, timestamp: &str, logger: Logger) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            timestamp: timestamp.to_string(),
            logger,
        }
    }

    /// Export in every requested format, returning the files written.
    ///
    /// An empty result writes nothing and logs a single "no data" line. A
    /// format that fails is logged and skipped; the others still run.
    pub fn export(&self, results: &ComparisonResult, formats: &[ReportFormat]) -> Vec<PathBuf> {
        if results.is_empty() {
            self.logger.warn("No flight data to save.");
            return vec![];
        }

        let mut written = vec![];
        for format in formats {
            let label = format.extension().to_uppercase();
            match self.export_format(results, *format) {
                Ok(ExportOutcome::Written(path)) => {
                    self.logger.success(&format!(
                        "{} saved: {}",
                        label,
                        path.display().to_string().dimmed()
                    ));
                    written.push(path);
                }
                Ok(ExportOutcome::NoData) => {}
                Err(e) => {
                    tracing::warn!(kind = %label, error = %e, "export failed");
                    self.logger
                        .error(&format!("{} export failed: {:#}", label, e));
                }
            }
        }
        written
    }

    pub fn export_format(
        &self,
        results: &ComparisonResult,
        format: ReportFormat,
    ) -> Result<ExportOutcome> {
        if results.is_empty() {
            return Ok(ExportOutcome::NoData);
        }

        let bytes = match format {
            ReportFormat::Csv => render_csv(results)?,
            ReportFormat::Xlsx => render_xlsx(results)?,
            ReportFormat::Json => serde_json::to_vec_pretty(results)?,
        };

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let path = self.persist(format, &bytes)?;
        Ok(ExportOutcome::Written(path))
    }

    /// Write a finished document to a fresh file, removing it again if the
    /// write does not complete
    fn persist(&self, format: ReportFormat, bytes: &[u8]) -> Result<PathBuf> {
        let (path, mut file) = self.create_unique(format)?;

        if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(rm) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %rm, "could not remove partial export");
            }
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }

        Ok(path)
    }

    /// Open a new file for this run, adding "-N" instead of overwriting
    fn create_unique(&self, format: ReportFormat) -> Result<(PathBuf, File)> {
        let ext = format.extension();
        for attempt in 0u32.. {
            let name = if attempt == 0 {
                format!("{}_{}.{}", FILE_STEM, self.timestamp, ext)
            } else {
                format!("{}_{}-{}.{}", FILE_STEM, self.timestamp, attempt, ext)
            };
            let path = self.output_dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        }
        anyhow::bail!("No free file name for {} export", ext)
    }
}

fn render_csv(results: &ComparisonResult) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_row(&mut out, &COLUMNS)?;
    for record in results {
        write_row(&mut out, &record.to_row())?;
    }
    Ok(out)
}

/// One "Flights" sheet: bold header row, then a row per record with
/// `numeric_price` stored as a number
fn render_xlsx(results: &ComparisonResult) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Flights")?;

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    for (i, record) in results.iter().enumerate() {
        let row = (i + 1) as u32;
        let cells = record.to_row();
        for (col, value) in cells.iter().take(COLUMNS.len() - 1).enumerate() {
            sheet.write_string(row, col as u16, value.as_str())?;
        }
        sheet.write_number(
            row,
            (COLUMNS.len() - 1) as u16,
            record.numeric_price() as f64,
        )?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one comma-separated row, quoting fields that need it
fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

/// Print the numbered listing and price summary
pub fn print_summary(results: &ComparisonResult, currency: &str, logger: &Logger) {
    if results.is_empty() {
        logger.warn("No flights found from any source.");
        return;
    }

    logger.rule(RULE_WIDTH);
    logger.line(&"FLIGHT COMPARISON RESULTS (Sorted by Price)".green().bold().to_string());
    logger.rule(RULE_WIDTH);

    for (i, record) in results.iter().enumerate() {
        logger.line(&listing_line(i + 1, record));
    }

    logger.rule(RULE_WIDTH);

    if let Some((min, max)) = results.price_range() {
        logger.line(&format!(
            "{} {} {} - {} {}",
            "Price range:".yellow().bold(),
            currency,
            group_thousands(min),
            currency,
            group_thousands(max)
        ));
    }
    match results.cheapest() {
        Some(cheapest) => logger.line(&format!(
            "{} {} - {} ({})",
            "Cheapest flight:".yellow().bold(),
            cheapest.airline(),
            cheapest.price(),
            cheapest.source()
        )),
        None => logger.warn("No listing had a readable price."),
    }
    for source in Source::ALL {
        logger.line(&format!(
            "{} {}: {} flights",
            source_marker(source),
            source,
            results.count_for(source)
        ));
    }
}

fn source_marker(source: Source) -> String {
    match source {
        Source::SastaTicket => "●".green().to_string(),
        Source::Bookme => "●".blue().to_string(),
    }
}

fn listing_line(position: usize, record: &FlightRecord) -> String {
    format!(
        "{:2}. {} {:<sw$} | {:<aw$} | {:<tw$} -> {:<tw$} | {:<stw$} | {:>pw$}",
        position,
        source_marker(record.source()),
        record.source().as_str(),
        clip(record.airline(), AIRLINE_WIDTH),
        record.departure(),
        record.arrival(),
        clip(record.stops(), STOPS_WIDTH),
        record.price(),
        sw = SOURCE_WIDTH,
        aw = AIRLINE_WIDTH,
        tw = TIME_WIDTH,
        stw = STOPS_WIDTH,
        pw = PRICE_WIDTH,
    )
}

/// Cut to at most `width` characters
fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
