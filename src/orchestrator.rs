//! Comparison orchestrator - runs each site, merges, reports

use anyhow::Result;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::adapter::{ScrapeConfig, SourceAdapter};
use crate::aggregate::merge_sources;
use crate::driver::Launcher;
use crate::flight::{ComparisonResult, Source};
use crate::log::Logger;
use crate::query::SearchQuery;
use crate::report::{self, ReportExporter, ReportFormat};

/// Options for a comparison run
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Origin airport code
    pub origin: String,
    /// Destination airport code
    pub destination: String,
    /// Travel date, MM/DD/YYYY
    pub date: String,
    /// Directory report files are written to
    pub output: PathBuf,
    /// Report files to write
    pub formats: Vec<ReportFormat>,
    /// WebDriver server URL
    pub webdriver_url: String,
    /// Pause between the two site searches
    pub site_pause: Duration,
    /// Label printed before prices in the summary
    pub currency: String,
    /// Per-site scrape limits
    pub scrape: ScrapeConfig,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            origin: "LHE".to_string(),
            destination: "KHI".to_string(),
            date: "07/13/2025".to_string(),
            output: PathBuf::from("."),
            formats: vec![ReportFormat::Csv, ReportFormat::Xlsx],
            webdriver_url: "http://localhost:9515".to_string(),
            site_pause: Duration::from_secs(2),
            currency: "PKR".to_string(),
            scrape: ScrapeConfig::default(),
        }
    }
}

/// Orchestrator for comparison runs
pub struct Orchestrator<L: Launcher> {
    options: CompareOptions,
    launcher: L,
    logger: Logger,
}

impl<L: Launcher> Orchestrator<L> {
    pub fn new(options: CompareOptions, launcher: L, logger: Logger) -> Self {
        Self {
            options,
            launcher,
            logger,
        }
    }

    /// Search every site in turn, merge, print and export.
    ///
    /// Only an invalid query fails the run; site and export failures are
    /// logged and the run carries on with whatever was gathered.
    pub fn run(&self) -> Result<ComparisonResult> {
        let query = SearchQuery::new(
            &self.options.origin,
            &self.options.destination,
            &self.options.date,
        )?;

        self.logger.step("Starting Flight Price Comparison");
        self.logger
            .line(&format!("  Route: {} -> {}", query.origin, query.destination));
        self.logger.line(&format!("  Date: {}", query.date));
        self.logger.rule(60);

        let mut lists: Vec<(Source, Vec<_>)> = vec![];
        for (i, source) in Source::ALL.into_iter().enumerate() {
            if i > 0 && !self.options.site_pause.is_zero() {
                thread::sleep(self.options.site_pause);
            }

            self.logger.step(&format!("Scraping {}...", source));
            let adapter = SourceAdapter::for_source(source);
            let site_logger = self.logger.scoped(source.as_str());
            let flights =
                adapter.search_flights(&self.launcher, &query, &self.options.scrape, &site_logger);
            self.logger
                .success(&format!("Found {} flights on {}", flights.len(), source));

            lists.push((source, flights));
        }

        self.logger.step("Comparing flight prices...");
        let results = merge_sources(lists);
        report::print_summary(&results, &self.options.currency, &self.logger);

        if !results.is_empty() {
            let exporter = ReportExporter::new(&self.options.output, self.logger.clone());
            let written = exporter.export(&results, &self.options.formats);
            if written.len() < self.options.formats.len() {
                self.logger.warn(&format!(
                    "Saved {} of {} report formats",
                    written.len(),
                    self.options.formats.len()
                ));
            }
        }

        self.logger.step("Flight comparison complete.");
        Ok(results)
    }
}
