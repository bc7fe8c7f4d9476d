pub mod adapter;
pub mod aggregate;
pub mod driver;
pub mod flight;
pub mod log;
mod orchestrator;
pub mod price;
pub mod query;
pub mod report;
pub mod session;

#[cfg(test)]
mod testing;

pub use flight::{ComparisonResult, FlightRecord, RawFlight, Source};
pub use orchestrator::{CompareOptions, Orchestrator};
pub use report::ReportFormat;

use anyhow::Result;
use colored::Colorize;

use crate::driver::WebDriverLauncher;
use crate::log::Logger;

/// Run a comparison against live sites through the configured WebDriver server
pub fn compare(options: CompareOptions) -> Result<ComparisonResult> {
    let logger = Logger::stdout();
    logger.line(&format!(
        "{} Using WebDriver at {}",
        ">>".yellow(),
        options.webdriver_url.cyan()
    ));

    let launcher = WebDriverLauncher::new(&options.webdriver_url);
    let orchestrator = Orchestrator::new(options, launcher, logger);
    orchestrator.run()
}
