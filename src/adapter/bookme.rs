//! bookme.pk search workflow

use crate::driver::{BrowserDriver, Condition, DriverError, Key, Locator};
use crate::flight::RawFlight;
use crate::log::Logger;
use crate::query::{DateParts, SearchQuery};

use super::{card_field, click_when_ready, pause, scan_cards, CardError, ScrapeConfig};

pub const FLIGHTS_URL: &str = "https://bookme.pk/flights";

/// Cards that must be rendered before scanning starts
const MIN_CARDS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Bookme;

fn card() -> Locator {
    Locator::css("div.flight-card")
}

fn airline() -> Locator {
    Locator::css(".airline-name")
}

/// Departure is the first match, arrival the second
fn times() -> Locator {
    Locator::css("h5.text-dark")
}

fn price() -> Locator {
    Locator::css("h3.text-primary")
}

fn month_year_select(label: &str) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class,'dp__month_year_select') and text()='{}']",
        label
    ))
}

fn overlay_cell(label: &str) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class,'dp__overlay_cell') and text()='{}']",
        label
    ))
}

fn day_cell(day: u32) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class,'day') and text()='{}']",
        day
    ))
}

impl Bookme {
    pub(super) fn run<D: BrowserDriver>(
        &self,
        driver: &mut D,
        query: &SearchQuery,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Result<Vec<RawFlight>, DriverError> {
        driver.navigate(FLIGHTS_URL)?;
        logger.success("Opened bookme.pk");

        // one-way trip tab
        click_when_ready(driver, &Locator::id("0"), config)?;
        pause(config.pacing.field_settle);

        self.type_airport(driver, "from", "from0", &query.origin, config)?;
        self.type_airport(driver, "to", "to0", &query.destination, config)?;

        self.pick_date(driver, &query.date.parts(), config, logger)?;

        let search = Locator::css("button[type='submit'].btn-primary");
        click_when_ready(driver, &search, config)?;
        logger.success("Search submitted, waiting for results...");

        driver.wait_until(
            &Condition::AtLeast(card(), MIN_CARDS),
            config.wait_timeout,
            config.poll_interval,
        )?;
        logger.success(&format!("{}+ flight cards loaded", MIN_CARDS));
        pause(config.pacing.results_settle);

        let flights = scan_cards(driver, &card(), config, read_card)?;
        logger.success(&format!("{} flights scraped", flights.len()));
        Ok(flights)
    }

    /// Open the airport popup, type the code one key at a time so the
    /// autocomplete keeps up, then accept the first suggestion.
    fn type_airport<D: BrowserDriver>(
        &self,
        driver: &mut D,
        outer_id: &str,
        inner_id: &str,
        code: &str,
        config: &ScrapeConfig,
    ) -> Result<(), DriverError> {
        click_when_ready(driver, &Locator::id(outer_id), config)?;
        pause(config.pacing.field_settle);

        let inner = Locator::id(inner_id);
        driver.wait_until(
            &Condition::Visible(inner.clone()),
            config.wait_timeout,
            config.poll_interval,
        )?;
        driver.clear(&inner)?;

        let mut buf = [0u8; 4];
        for ch in code.chars() {
            driver.type_text(&inner, ch.encode_utf8(&mut buf))?;
            pause(config.pacing.keystroke);
        }

        pause(config.pacing.autocomplete);
        driver.type_text(&inner, Key::ArrowDown.as_str())?;
        pause(config.pacing.field_settle);
        driver.type_text(&inner, Key::Enter.as_str())
    }

    /// The picker only accepts month, then year, then day.
    fn pick_date<D: BrowserDriver>(
        &self,
        driver: &mut D,
        parts: &DateParts,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Result<(), DriverError> {
        logger.success(&format!(
            "Selecting date: {} {} {}",
            parts.day, parts.month, parts.year
        ));

        let input = Locator::css("input[placeholder='Departure Date']");
        click_when_ready(driver, &input, config)?;
        pause(config.pacing.field_settle);

        for label in [&parts.month, &parts.year] {
            click_when_ready(driver, &month_year_select(label), config)?;
            pause(config.pacing.field_settle);
            click_when_ready(driver, &overlay_cell(label), config)?;
            pause(config.pacing.field_settle);
        }

        click_when_ready(driver, &day_cell(parts.day), config)?;
        pause(config.pacing.field_settle);
        Ok(())
    }
}

fn read_card<D: BrowserDriver>(driver: &mut D, index: usize) -> Result<RawFlight, CardError> {
    let card = card();
    Ok(RawFlight {
        airline: card_field(driver, &card, index, &airline(), 0, "airline")?,
        departure: card_field(driver, &card, index, &times(), 0, "departure")?,
        arrival: card_field(driver, &card, index, &times(), 1, "arrival")?,
        price: card_field(driver, &card, index, &price(), 0, "price")?,
        stops: None,
    })
}
