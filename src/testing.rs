//! Scriptable in-memory browser for adapter and orchestrator tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::driver::{BrowserDriver, Condition, DriverError, Launcher, Locator};

/// One result card: field locator -> texts found inside the card
#[derive(Debug, Clone, Default)]
pub struct StubCard {
    fields: HashMap<Locator, Vec<String>>,
}

impl StubCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, locator: &Locator, text: &str) -> Self {
        self.fields
            .entry(locator.clone())
            .or_default()
            .push(text.to_string());
        self
    }
}

/// Every locator is present, visible and clickable unless listed in
/// `without`. The card locator reports exactly the configured cards.
pub struct StubDriver {
    card_locator: Option<Locator>,
    cards: Vec<StubCard>,
    missing: HashSet<Locator>,
    fail_navigation: bool,
    viewport: u32,
    pub calls: Rc<RefCell<Vec<String>>>,
    pub closes: Rc<Cell<u32>>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            card_locator: None,
            cards: vec![],
            missing: HashSet::new(),
            fail_navigation: false,
            viewport: 800,
            calls: Rc::new(RefCell::new(vec![])),
            closes: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_cards(mut self, card_locator: Locator, cards: Vec<StubCard>) -> Self {
        self.card_locator = Some(card_locator);
        self.cards = cards;
        self
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.insert(locator);
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn viewport(mut self, height: u32) -> Self {
        self.viewport = height;
        self
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn card_count(&self, locator: &Locator) -> Option<usize> {
        match &self.card_locator {
            Some(card) if card == locator => Some(self.cards.len()),
            _ => None,
        }
    }

    fn present(&self, locator: &Locator) -> bool {
        match self.card_count(locator) {
            Some(n) => n > 0,
            None => !self.missing.contains(locator),
        }
    }

    fn require(&self, locator: &Locator) -> Result<(), DriverError> {
        if self.present(locator) {
            Ok(())
        } else {
            Err(DriverError::NoSuchElement(locator.to_string()))
        }
    }
}

impl BrowserDriver for StubDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.record(format!("navigate {}", url));
        if self.fail_navigation {
            return Err(DriverError::Protocol {
                error: "unknown error".to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    fn find_and_click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.require(locator)?;
        self.record(format!("click {}", locator));
        Ok(())
    }

    fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.require(locator)?;
        self.record(format!("type {} {:?}", locator, text));
        Ok(())
    }

    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.require(locator)?;
        self.record(format!("clear {}", locator));
        Ok(())
    }

    fn check(&mut self, condition: &Condition) -> Result<bool, DriverError> {
        Ok(match condition {
            Condition::Present(l) | Condition::Visible(l) | Condition::Clickable(l) => {
                self.present(l)
            }
            Condition::AtLeast(l, n) => match self.card_count(l) {
                Some(count) => count >= *n,
                None => !self.missing.contains(l),
            },
        })
    }

    fn count(&mut self, locator: &Locator) -> Result<usize, DriverError> {
        Ok(self
            .card_count(locator)
            .unwrap_or(usize::from(self.present(locator))))
    }

    fn scroll_by(&mut self, pixels: u32) -> Result<(), DriverError> {
        self.record(format!("scroll {}", pixels));
        Ok(())
    }

    fn viewport_height(&mut self) -> Result<u32, DriverError> {
        Ok(self.viewport)
    }

    fn read_text(&mut self, locator: &Locator) -> Result<String, DriverError> {
        self.require(locator)?;
        Ok(String::new())
    }

    fn card_texts(
        &mut self,
        card: &Locator,
        index: usize,
        field: &Locator,
    ) -> Result<Vec<String>, DriverError> {
        if self.card_count(card).is_none() {
            return Err(DriverError::NoSuchElement(card.to_string()));
        }
        let stub = self
            .cards
            .get(index)
            .ok_or_else(|| DriverError::NoSuchElement(format!("{} [{}]", card, index)))?;
        Ok(stub.fields.get(field).cloned().unwrap_or_default())
    }

    fn close_session(&mut self) -> Result<(), DriverError> {
        self.closes.set(self.closes.get() + 1);
        self.record("close".to_string());
        Ok(())
    }
}

/// Hands out prepared drivers in order; launch fails once they run out
#[derive(Default)]
pub struct StubLauncher {
    drivers: RefCell<VecDeque<StubDriver>>,
}

impl StubLauncher {
    pub fn new(drivers: Vec<StubDriver>) -> Self {
        Self {
            drivers: RefCell::new(drivers.into()),
        }
    }
}

impl Launcher for StubLauncher {
    type Driver = StubDriver;

    fn launch(&self) -> Result<StubDriver, DriverError> {
        self.drivers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| DriverError::Protocol {
                error: "session not created".to_string(),
                message: "no browser available".to_string(),
            })
    }
}
