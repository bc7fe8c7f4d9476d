//! Merge per-site listings into one price-ordered comparison

use crate::flight::{ComparisonResult, FlightRecord, RawFlight, Source};

/// Merge SastaTicket and Bookme listings.
///
/// Records keep their scrape order within a source, SastaTicket first,
/// and are then stable-sorted by numeric price. Nothing is deduplicated
/// across sources.
pub fn merge(sasta: Vec<RawFlight>, bookme: Vec<RawFlight>) -> ComparisonResult {
    merge_sources(vec![(Source::SastaTicket, sasta), (Source::Bookme, bookme)])
}

/// Merge any number of tagged lists, in the order given.
pub fn merge_sources(lists: Vec<(Source, Vec<RawFlight>)>) -> ComparisonResult {
    let mut records: Vec<FlightRecord> = lists
        .into_iter()
        .flat_map(|(source, flights)| {
            flights
                .into_iter()
                .map(move |raw| FlightRecord::from_raw(source, raw))
        })
        .collect();

    // sort_by_key is stable
    records.sort_by_key(FlightRecord::numeric_price);

    ComparisonResult::from_sorted(records)
}
