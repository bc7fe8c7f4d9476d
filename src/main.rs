use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let defaults = fare_compare::CompareOptions::default();

    let mut formats = report_formats(&cli.format);
    if formats.is_empty() {
        formats = defaults.formats.clone();
    }

    let options = fare_compare::CompareOptions {
        origin: cli.origin,
        destination: cli.destination,
        date: cli.date,
        output: cli.output,
        formats,
        webdriver_url: cli.webdriver,
        site_pause: Duration::from_secs(cli.site_pause_secs),
        scrape: fare_compare::adapter::ScrapeConfig {
            target_flights: cli.target,
            scroll_ceiling_px: cli.scroll_ceiling,
            wait_timeout: Duration::from_secs(cli.timeout_secs),
            ..defaults.scrape.clone()
        },
        ..defaults
    };

    fare_compare::compare(options)?;

    Ok(())
}

/// Map CLI formats in the order given, dropping repeats
fn report_formats(requested: &[OutputFormat]) -> Vec<fare_compare::ReportFormat> {
    let mut formats = Vec::with_capacity(requested.len());
    for f in requested {
        let format = match f {
            OutputFormat::Csv => fare_compare::ReportFormat::Csv,
            OutputFormat::Xlsx => fare_compare::ReportFormat::Xlsx,
            OutputFormat::Json => fare_compare::ReportFormat::Json,
        };
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    formats
}

#[derive(Parser)]
#[command(
    name = "fare-compare",
    about = "Compare one-way flight prices on SastaTicket and Bookme",
    version
)]
struct Cli {
    /// Origin airport code
    #[arg(long, default_value = "LHE")]
    origin: String,
    /// Destination airport code
    #[arg(long, default_value = "KHI")]
    destination: String,
    /// Travel date (MM/DD/YYYY)
    #[arg(long, default_value = "07/13/2025")]
    date: String,
    /// Directory for report files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
    /// Report formats (repeatable; default csv + xlsx)
    #[arg(long, value_enum)]
    format: Vec<OutputFormat>,
    /// WebDriver server URL
    #[arg(long, default_value = "http://localhost:9515")]
    webdriver: String,
    /// Unique flights to collect per site before stopping
    #[arg(long, default_value = "5")]
    target: usize,
    /// Maximum pixels to scroll per site
    #[arg(long, default_value = "4000")]
    scroll_ceiling: u32,
    /// Seconds to wait for each page element
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
    /// Seconds to pause between sites
    #[arg(long, default_value = "2")]
    site_pause_secs: u64,
    /// Show WebDriver diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Xlsx,
    Json,
}
