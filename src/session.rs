//! Scoped browser session: torn down on every exit path

use std::ops::{Deref, DerefMut};

use crate::driver::{BrowserDriver, DriverError};
use crate::log::Logger;

/// Owns a driver and closes its session when dropped.
///
/// `close` reports teardown errors to the caller; the drop path logs them.
pub struct Session<D: BrowserDriver> {
    driver: D,
    logger: Logger,
    closed: bool,
}

impl<D: BrowserDriver> Session<D> {
    pub fn new(driver: D, logger: Logger) -> Self {
        Self {
            driver,
            logger,
            closed: false,
        }
    }

    /// Close now and surface any teardown error
    pub fn close(mut self) -> Result<(), DriverError> {
        self.closed = true;
        let result = self.driver.close_session();
        if result.is_ok() {
            self.logger.success("Browser closed");
        }
        result
    }
}

impl<D: BrowserDriver> Deref for Session<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.driver
    }
}

impl<D: BrowserDriver> DerefMut for Session<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: BrowserDriver> Drop for Session<D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.driver.close_session() {
            Ok(()) => self.logger.success("Browser closed"),
            Err(e) => {
                tracing::warn!(error = %e, "browser teardown failed");
                self.logger.warn(&format!("Failed to close browser: {}", e));
            }
        }
    }
}
