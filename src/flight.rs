//! Flight listing types shared by the adapters, aggregator and exporter

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::price;

/// Placeholder written when a site does not report stops
pub const STOPS_UNKNOWN: &str = "N/A";

/// Travel site a record was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    SastaTicket,
    Bookme,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::SastaTicket, Source::Bookme];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::SastaTicket => "SastaTicket",
            Source::Bookme => "Bookme",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing exactly as read from one result card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFlight {
    pub airline: String,
    pub departure: String,
    pub arrival: String,
    pub price: String,
    pub stops: Option<String>,
}

impl RawFlight {
    /// Key used to collapse the same listing seen twice during one scan
    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey(format!(
            "{}-{}-{}-{}",
            self.airline, self.departure, self.arrival, self.price
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A normalized listing tagged with its source.
///
/// Fields are private so `numeric_price` can only ever be derived from
/// `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightRecord {
    source: Source,
    airline: String,
    departure: String,
    arrival: String,
    stops: String,
    price: String,
    numeric_price: u64,
}

impl FlightRecord {
    pub fn from_raw(source: Source, raw: RawFlight) -> Self {
        let numeric_price = price::normalize(Some(raw.price.as_str()));
        Self {
            source,
            airline: raw.airline,
            departure: raw.departure,
            arrival: raw.arrival,
            stops: raw.stops.unwrap_or_else(|| STOPS_UNKNOWN.to_string()),
            price: raw.price,
            numeric_price,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn airline(&self) -> &str {
        &self.airline
    }

    pub fn departure(&self) -> &str {
        &self.departure
    }

    pub fn arrival(&self) -> &str {
        &self.arrival
    }

    pub fn stops(&self) -> &str {
        &self.stops
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn numeric_price(&self) -> u64 {
        self.numeric_price
    }

    /// Column values in export order
    pub fn to_row(&self) -> [String; 7] {
        [
            self.source.to_string(),
            self.airline.clone(),
            self.departure.clone(),
            self.arrival.clone(),
            self.stops.clone(),
            self.price.clone(),
            self.numeric_price.to_string(),
        ]
    }
}

/// Export column names, in order
pub const COLUMNS: [&str; 7] = [
    "source",
    "airline",
    "departure",
    "arrival",
    "stops",
    "price",
    "numeric_price",
];

/// Merged listings ordered by ascending numeric price
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    records: Vec<FlightRecord>,
}

impl ComparisonResult {
    /// Wrap records that are already in price order
    pub(crate) fn from_sorted(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_for(&self, source: Source) -> usize {
        self.records.iter().filter(|r| r.source == source).count()
    }

    /// First record with a known (positive) price
    pub fn cheapest(&self) -> Option<&FlightRecord> {
        self.records.iter().find(|r| r.numeric_price > 0)
    }

    /// (min, max) over records with a positive numeric price
    pub fn price_range(&self) -> Option<(u64, u64)> {
        let mut prices = self
            .records
            .iter()
            .map(|r| r.numeric_price)
            .filter(|p| *p > 0);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

impl<'a> IntoIterator for &'a ComparisonResult {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
