use miette::Result;
use rayon::prelude::*;
use region_grid::Position;
use tracing::{debug, info};

use crate::patrol::{Lab, Outcome, PatrolError};

/// Whether one more obstacle at `position` keeps the guard inside forever.
/// A guard boxed in on all four sides never leaves either.
fn traps_guard(lab: &Lab, position: Position) -> Result<bool, PatrolError> {
    match lab.patrol(Some(position)) {
        Ok(Outcome::Looped) | Err(PatrolError::Boxed { .. }) => Ok(true),
        Ok(Outcome::Exited { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Cells where a single added obstacle traps the guard in a loop.
///
/// Only cells on the unobstructed route can change the patrol, and the
/// guard's own starting cell is off limits.
pub fn loop_positions(lab: &Lab) -> Result<Vec<Position>> {
    let start = lab.guard().position;
    let candidates = lab
        .route()?
        .into_iter()
        .filter(|position| *position != start)
        .collect::<Vec<_>>();
    debug!(candidates = candidates.len(), "testing obstacle positions");

    let trapping = candidates
        .into_par_iter()
        .map(|position| traps_guard(lab, position).map(|trapped| trapped.then_some(position)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(trapping.into_iter().flatten().collect())
}

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let lab = Lab::parse(input)?;
    let positions = loop_positions(&lab)?;

    info!(loops = positions.len(), "found loop positions");
    Ok(positions.len().to_string())
}
