//! Site adapters: drive one travel site's search and scrape its result cards

pub mod bookme;
pub mod sasta;

use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::driver::{BrowserDriver, Condition, DriverError, Launcher, Locator};
use crate::flight::{RawFlight, Source};
use crate::log::Logger;
use crate::query::SearchQuery;
use crate::session::Session;

pub use bookme::Bookme;
pub use sasta::SastaTicket;

/// Smallest scroll step, so a zero-height viewport still makes progress
const MIN_SCROLL_STEP: u32 = 100;

/// Fixed pauses the site widgets need between interactions
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    pub page_settle: Duration,
    pub field_settle: Duration,
    pub keystroke: Duration,
    pub autocomplete: Duration,
    pub calendar_open: Duration,
    pub scroll: Duration,
    pub results_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_settle: Duration::from_secs(3),
            field_settle: Duration::from_secs(1),
            keystroke: Duration::from_millis(200),
            autocomplete: Duration::from_secs(2),
            calendar_open: Duration::from_secs(2),
            scroll: Duration::from_secs(2),
            results_settle: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            page_settle: Duration::ZERO,
            field_settle: Duration::ZERO,
            keystroke: Duration::ZERO,
            autocomplete: Duration::ZERO,
            calendar_open: Duration::ZERO,
            scroll: Duration::ZERO,
            results_settle: Duration::ZERO,
        }
    }
}

pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Limits for one site search
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    /// Stop scanning once this many unique listings are collected
    pub target_flights: usize,
    /// Stop scanning once this many pixels have been scrolled
    pub scroll_ceiling_px: u32,
    /// Bound on each wait for a UI condition
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub pacing: Pacing,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target_flights: 5,
            scroll_ceiling_px: 4000,
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            pacing: Pacing::default(),
        }
    }
}

/// Adapter failure: the whole search for one site is lost
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to start browser: {0}")]
    Launch(#[source] DriverError),

    #[error("{site} search failed: {error}")]
    Site {
        site: Source,
        #[source]
        error: DriverError,
    },
}

/// A single result card could not be read
#[derive(Debug, Error)]
pub enum CardError {
    #[error("card {index} has no {field}")]
    MissingField { index: usize, field: &'static str },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// The supported travel sites
#[derive(Debug, Clone)]
pub enum SourceAdapter {
    SastaTicket(SastaTicket),
    Bookme(Bookme),
}

impl SourceAdapter {
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::SastaTicket => SourceAdapter::SastaTicket(SastaTicket),
            Source::Bookme => SourceAdapter::Bookme(Bookme),
        }
    }

    pub fn source(&self) -> Source {
        match self {
            SourceAdapter::SastaTicket(_) => Source::SastaTicket,
            SourceAdapter::Bookme(_) => Source::Bookme,
        }
    }

    /// Search one site in a fresh browser session.
    ///
    /// Never fails: any fault is logged and yields an empty list. The
    /// session is closed on every path.
    pub fn search_flights<L: Launcher>(
        &self,
        launcher: &L,
        query: &SearchQuery,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Vec<RawFlight> {
        match self.try_search(launcher, query, config, logger) {
            Ok(flights) => flights,
            Err(e) => {
                tracing::warn!(site = %self.source(), error = %e, "adapter failed");
                logger.error(&format!("Scraping error: {}", e));
                vec![]
            }
        }
    }

    fn try_search<L: Launcher>(
        &self,
        launcher: &L,
        query: &SearchQuery,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Result<Vec<RawFlight>, ScrapeError> {
        let driver = launcher.launch().map_err(ScrapeError::Launch)?;
        let mut session = Session::new(driver, logger.clone());

        let site = self.source();
        let flights = self
            .run(&mut *session, query, config, logger)
            .map_err(|error| ScrapeError::Site { site, error })?;

        if let Err(e) = session.close() {
            logger.warn(&format!("Failed to close browser: {}", e));
        }

        Ok(flights)
    }

    fn run<D: BrowserDriver>(
        &self,
        driver: &mut D,
        query: &SearchQuery,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Result<Vec<RawFlight>, DriverError> {
        match self {
            SourceAdapter::SastaTicket(site) => site.run(driver, query, config, logger),
            SourceAdapter::Bookme(site) => site.run(driver, query, config, logger),
        }
    }
}

/// Wait for an element to become clickable, then click it
pub(crate) fn click_when_ready<D: BrowserDriver>(
    driver: &mut D,
    locator: &Locator,
    config: &ScrapeConfig,
) -> Result<(), DriverError> {
    driver.wait_until(
        &Condition::Clickable(locator.clone()),
        config.wait_timeout,
        config.poll_interval,
    )?;
    driver.find_and_click(locator)
}

/// Read every card matched by `card`, scroll, and repeat.
///
/// Listings are deduplicated by composite key. The scan stops when
/// `target_flights` unique listings are held or the scrolled distance
/// passes `scroll_ceiling_px`. Unreadable cards are skipped.
pub(crate) fn scan_cards<D, F>(
    driver: &mut D,
    card: &Locator,
    config: &ScrapeConfig,
    mut read_card: F,
) -> Result<Vec<RawFlight>, DriverError>
where
    D: BrowserDriver,
    F: FnMut(&mut D, usize) -> Result<RawFlight, CardError>,
{
    let step = driver.viewport_height()?.max(MIN_SCROLL_STEP);
    let mut scrolled: u32 = 0;
    let mut seen = HashSet::new();
    let mut flights = vec![];

    while seen.len() < config.target_flights {
        driver.scroll_by(step)?;
        pause(config.pacing.scroll);
        scrolled = scrolled.saturating_add(step);

        let cards = driver.count(card)?;
        for index in 0..cards {
            match read_card(driver, index) {
                Ok(flight) => {
                    if seen.insert(flight.composite_key()) {
                        flights.push(flight);
                    }
                }
                Err(e) => tracing::debug!(index, error = %e, "skipping unreadable card"),
            }
        }

        if scrolled > config.scroll_ceiling_px {
            break;
        }
    }

    Ok(flights)
}

/// Trimmed text of the `nth` match of `field` inside card `index`
pub(crate) fn card_field<D: BrowserDriver>(
    driver: &mut D,
    card: &Locator,
    index: usize,
    field: &Locator,
    nth: usize,
    name: &'static str,
) -> Result<String, CardError> {
    let texts = driver.card_texts(card, index, field)?;
    texts
        .get(nth)
        .map(|t| t.trim().to_string())
        .ok_or(CardError::MissingField { index, field: name })
}
