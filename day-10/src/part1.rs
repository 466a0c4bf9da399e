use miette::Result;
use tracing::info;

use crate::trails::TrailMap;

/// Processes a topographic map and returns the summed trailhead scores.
///
/// A trailhead's score is the number of distinct peaks it can reach by
/// climbing exactly one height per step.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let map = TrailMap::parse(input)?;
    let summary = map.summarize();

    info!(
        trailheads = summary.trailheads,
        score = summary.score,
        "scored trailheads"
    );
    Ok(summary.score.to_string())
}
