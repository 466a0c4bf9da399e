use miette::Result;
use tracing::info;

use crate::trails::TrailMap;

/// Processes a topographic map and returns the summed trailhead ratings,
/// the number of distinct uphill trails starting at each trailhead.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let map = TrailMap::parse(input)?;
    let summary = map.summarize();

    info!(
        trailheads = summary.trailheads,
        rating = summary.rating,
        "rated trailheads"
    );
    Ok(summary.rating.to_string())
}
