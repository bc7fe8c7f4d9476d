//! sastaticket.pk search workflow

use crate::driver::{BrowserDriver, Condition, DriverError, Key, Locator};
use crate::flight::RawFlight;
use crate::log::Logger;
use crate::query::SearchQuery;

use super::{card_field, click_when_ready, pause, scan_cards, CardError, ScrapeConfig};

pub const HOME_URL: &str = "https://www.sastaticket.pk/";

/// Cards that must be rendered before scanning starts
const MIN_CARDS: usize = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct SastaTicket;

fn card() -> Locator {
    Locator::css("div[data-test='search-flight-card-container']")
}

fn airline() -> Locator {
    Locator::css("span.text-sm.font-secondary")
}

fn start_time() -> Locator {
    Locator::css("span[data-test='search-flight-card-start-time']")
}

fn end_time() -> Locator {
    Locator::css("span[data-test='search-flight-card-end-time']")
}

fn stop_text() -> Locator {
    Locator::css("span[data-test='search-flight-card-stop-text']")
}

fn price_button() -> Locator {
    Locator::css("button[data-test='search-flight-card-price-button-main']")
}

impl SastaTicket {
    pub(super) fn run<D: BrowserDriver>(
        &self,
        driver: &mut D,
        query: &SearchQuery,
        config: &ScrapeConfig,
        logger: &Logger,
    ) -> Result<Vec<RawFlight>, DriverError> {
        driver.navigate(HOME_URL)?;
        logger.success("Opened sastaticket.pk");
        pause(config.pacing.page_settle);

        self.pick_airport(driver, "rc_select_0", &query.origin, config)?;
        self.pick_airport(driver, "rc_select_1", &query.destination, config)?;

        let date_input = Locator::css("input[data-test='search-fields-date-picker-departing']");
        click_when_ready(driver, &date_input, config)?;
        pause(config.pacing.calendar_open);

        let day = Locator::css(format!(
            "div[data-test='search-fields-date-picker-depart-{}']",
            query.date.long_label()
        ));
        click_when_ready(driver, &day, config)?;
        pause(config.pacing.field_settle);

        let search = Locator::css("button[data-test='search-fields-search-button']");
        click_when_ready(driver, &search, config)?;
        logger.success("Search submitted, waiting for flights...");

        driver.wait_until(
            &Condition::AtLeast(card(), MIN_CARDS),
            config.wait_timeout,
            config.poll_interval,
        )?;
        pause(config.pacing.results_settle);

        let flights = scan_cards(driver, &card(), config, read_card)?;
        logger.success(&format!("{} flights scraped", flights.len()));
        Ok(flights)
    }

    /// Autocomplete field: type the code, then accept the first suggestion
    fn pick_airport<D: BrowserDriver>(
        &self,
        driver: &mut D,
        input_id: &str,
        code: &str,
        config: &ScrapeConfig,
    ) -> Result<(), DriverError> {
        let input = Locator::id(input_id);
        click_when_ready(driver, &input, config)?;
        driver.type_text(&input, code)?;
        pause(config.pacing.field_settle);
        driver.type_text(&input, Key::ArrowDown.as_str())?;
        driver.type_text(&input, Key::Enter.as_str())
    }
}

fn read_card<D: BrowserDriver>(driver: &mut D, index: usize) -> Result<RawFlight, CardError> {
    let card = card();
    Ok(RawFlight {
        airline: card_field(driver, &card, index, &airline(), 0, "airline")?,
        departure: card_field(driver, &card, index, &start_time(), 0, "departure")?,
        arrival: card_field(driver, &card, index, &end_time(), 0, "arrival")?,
        stops: Some(card_field(driver, &card, index, &stop_text(), 0, "stops")?),
        price: card_field(driver, &card, index, &price_button(), 0, "price")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::tests::quick_config;
    use crate::testing::{StubCard, StubDriver};

    fn listing(airline_name: &str, dep: &str, price: &str) -> StubCard {
        StubCard::new()
            .field(&airline(), airline_name)
            .field(&start_time(), dep)
            .field(&end_time(), "12:00")
            .field(&stop_text(), "Non-stop")
            .field(&price_button(), price)
    }

    fn query() -> SearchQuery {
        SearchQuery::new("LHE", "KHI", "07/13/2025").unwrap()
    }

    #[test]
    fn test_search_reads_cards() {
        let cards = vec![
            listing("PIA", "10:00", "PKR 15,000"),
            listing("Serene Air", "11:00", "PKR 13,200"),
            listing("PIA", "10:00", "PKR 15,000"),
        ];
        let mut driver = StubDriver::new().with_cards(card(), cards);
        let (logger, _buffer) = Logger::buffer();

        let flights = SastaTicket
            .run(&mut driver, &query(), &quick_config(), &logger)
            .unwrap();

        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].airline, "PIA");
        assert_eq!(flights[0].stops.as_deref(), Some("Non-stop"));
        assert_eq!(flights[1].price, "PKR 13,200");
    }

    #[test]
    fn test_search_interaction_order() {
        let mut driver = StubDriver::new().with_cards(card(), vec![listing("PIA", "10:00", "1")]);
        let calls = driver.calls.clone();
        let (logger, _buffer) = Logger::buffer();

        SastaTicket
            .run(&mut driver, &query(), &quick_config(), &logger)
            .unwrap();

        let calls = calls.borrow();
        assert_eq!(calls[0], format!("navigate {}", HOME_URL));
        assert_eq!(calls[1], "click #rc_select_0");
        assert_eq!(calls[2], "type #rc_select_0 \"LHE\"");
        assert!(calls.iter().any(|c| c.contains("search-fields-date-picker-depart-Sun Jul 13 2025")));

        let origin = calls.iter().position(|c| c.contains("\"LHE\"")).unwrap();
        let destination = calls.iter().position(|c| c.contains("\"KHI\"")).unwrap();
        let submit = calls
            .iter()
            .position(|c| c.contains("search-fields-search-button"))
            .unwrap();
        assert!(origin < destination && destination < submit);
    }

    #[test]
    fn test_no_results_times_out() {
        let mut driver = StubDriver::new().with_cards(card(), vec![]);
        let (logger, _buffer) = Logger::buffer();

        let err = SastaTicket
            .run(&mut driver, &query(), &quick_config(), &logger)
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout { .. }));
    }

    #[test]
    fn test_missing_stop_text_skips_card() {
        let cards = vec![
            StubCard::new()
                .field(&airline(), "PIA")
                .field(&start_time(), "10:00")
                .field(&end_time(), "12:00")
                .field(&price_button(), "PKR 1"),
            listing("Air Sial", "13:00", "PKR 2"),
        ];
        let mut driver = StubDriver::new().with_cards(card(), cards);
        let (logger, _buffer) = Logger::buffer();

        let flights = SastaTicket
            .run(&mut driver, &query(), &quick_config(), &logger)
            .unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].airline, "Air Sial");
    }
}
