use std::hash::Hash;

use tracing::debug;

use crate::adjacency::Adjacency;
use crate::regions::RegionIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMetrics<T> {
    pub label: T,
    pub index: usize,
    pub area: usize,
    pub perimeter: usize,
    pub corners: usize,
}

impl<T> RegionMetrics<T> {
    /// Fence price charged per boundary segment.
    pub fn price(&self) -> usize {
        self.area * self.perimeter
    }

    /// Fence price charged per straight side. A polygon has as many sides
    /// as corners.
    pub fn bulk_price(&self) -> usize {
        self.area * self.corners
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FencePrices {
    pub standard: usize,
    pub bulk: usize,
}

/// Corners of the region outline that belong to `cell`.
///
/// Each boundary direction is paired with the next direction clockwise. If
/// that one is a boundary too the outline turns outward here. If it is open,
/// the outline turns inward unless the neighbour on the open side carries the
/// same boundary, in which case the side simply continues.
pub fn corners(adjacency: &Adjacency, cell: usize) -> usize {
    let boundaries = adjacency.boundaries(cell);
    match boundaries.len() {
        0 => 0,
        4 => 4,
        _ => boundaries
            .iter()
            .filter(|&direction| {
                let next = direction.clockwise();
                if boundaries.contains(next) {
                    return true;
                }
                adjacency
                    .neighbor(cell, next)
                    .map_or(true, |neighbor| {
                        !adjacency.boundaries(neighbor).contains(direction)
                    })
            })
            .count(),
    }
}

#[tracing::instrument(skip_all)]
pub fn measure<T: Clone + Eq + Hash>(
    index: &RegionIndex<T>,
    adjacency: &Adjacency,
) -> Vec<RegionMetrics<T>> {
    let metrics = index
        .regions()
        .map(|region| RegionMetrics {
            label: region.label.clone(),
            index: region.index,
            area: region.area(),
            perimeter: region
                .cells()
                .iter()
                .map(|&cell| adjacency.perimeter_contribution(cell))
                .sum(),
            corners: region
                .cells()
                .iter()
                .map(|&cell| corners(adjacency, cell))
                .sum(),
        })
        .collect::<Vec<_>>();

    debug!(regions = metrics.len(), "measured regions");
    metrics
}

pub fn fence_prices<T>(metrics: &[RegionMetrics<T>]) -> FencePrices {
    metrics.iter().fold(FencePrices::default(), |acc, region| FencePrices {
        standard: acc.standard + region.price(),
        bulk: acc.bulk + region.bulk_price(),
    })
}
