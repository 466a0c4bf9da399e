use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use tracing::debug;

use crate::adjacency::Adjacency;
use crate::error::{GridError, InvariantViolationError};
use crate::grid::Grid;
use crate::regions::{RegionIndex, RegionRef};

/// Checks that `index` is a true partition of `grid` into maximal connected
/// same-label regions.
///
/// Checks run in order: each cell sits in exactly one live region whose slot
/// matches the cell's recorded assignment, regions hold only their own label,
/// regions are connected, and no same-label neighbours are split apart.
#[tracing::instrument(skip_all)]
pub fn validate<T>(
    grid: &Grid<T>,
    adjacency: &Adjacency,
    index: &RegionIndex<T>,
) -> Result<(), GridError>
where
    T: Clone + Eq + Hash + Debug,
{
    let mut owner: Vec<Option<(&T, usize)>> = vec![None; grid.len()];

    for region in index.regions() {
        for &cell in region.cells() {
            let position = grid.position_of(cell);
            if owner[cell].replace((region.label, region.index)).is_some() {
                return Err(InvariantViolationError::DuplicateCell {
                    x: position.x,
                    y: position.y,
                }
                .into());
            }

            if index.region_of(cell) != Some(region.index) {
                return Err(InvariantViolationError::StaleAssignment {
                    x: position.x,
                    y: position.y,
                    recorded: index.region_of(cell),
                    actual: region.index,
                }
                .into());
            }
        }
    }

    if let Some(cell) = owner.iter().position(Option::is_none) {
        let position = grid.position_of(cell);
        return Err(InvariantViolationError::Unassigned {
            x: position.x,
            y: position.y,
        }
        .into());
    }

    for region in index.regions() {
        for &cell in region.cells() {
            let found = &grid.cell(cell).label;
            if found != region.label {
                let position = grid.position_of(cell);
                return Err(InvariantViolationError::LabelMismatch {
                    label: format!("{:?}", region.label),
                    index: region.index,
                    found: format!("{found:?}"),
                    x: position.x,
                    y: position.y,
                }
                .into());
            }
        }

        check_connected(adjacency, &region)?;
    }

    for (cell, region) in owner.iter().enumerate().filter_map(|(c, o)| Some((c, (*o)?))) {
        if let Some(other) = adjacency
            .same_label_neighbors(cell)
            .find(|&neighbor| owner[neighbor] != Some(region))
        {
            let position = grid.position_of(cell);
            let neighbor = grid.position_of(other);
            return Err(InvariantViolationError::NotMaximal {
                label: format!("{:?}", region.0),
                x: position.x,
                y: position.y,
                nx: neighbor.x,
                ny: neighbor.y,
            }
            .into());
        }
    }

    debug!(regions = index.region_count(), "regions validated");
    Ok(())
}

fn check_connected<T: Debug>(
    adjacency: &Adjacency,
    region: &RegionRef<'_, T>,
) -> Result<(), InvariantViolationError> {
    let mut graph = UnGraph::<usize, ()>::with_capacity(region.area(), region.area() * 2);
    let nodes = region
        .cells()
        .iter()
        .map(|&cell| (cell, graph.add_node(cell)))
        .collect::<HashMap<_, _>>();

    for (&cell, &node) in &nodes {
        for neighbor in adjacency.same_label_neighbors(cell).filter(|n| *n > cell) {
            if let Some(&other) = nodes.get(&neighbor) {
                graph.add_edge(node, other, ());
            }
        }
    }

    match connected_components(&graph) {
        1 => Ok(()),
        components => Err(InvariantViolationError::Disconnected {
            label: format!("{:?}", region.label),
            index: region.index,
            components,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grid;
    use crate::regions::{Region, RegionBuilder, VisitOrder};
    use rstest::rstest;

    #[rstest]
    #[case::row_major(VisitOrder::RowMajor)]
    #[case::column_major(VisitOrder::ColumnMajor)]
    #[case::reverse(VisitOrder::ReverseRowMajor)]
    fn test_built_regions_are_valid(#[case] order: VisitOrder) -> miette::Result<()> {
        let grid = parse_grid(
            "RRRRIICCFF
RRRRIICCCF
VVRRRCCFFF
VVRCCCJFFF
VVVVCJJCFE
VVIVCCJJEE
VVIIICJJEE
MIIIIIJJEE
MIIISIJEEE
MMMISSJEEE",
        )?;
        let adjacency = Adjacency::link(&grid);
        let index = RegionBuilder::new(&grid, &adjacency).with_order(order).build();

        validate(&grid, &adjacency, &index)?;
        Ok(())
    }

    #[test]
    fn test_detects_label_mismatch() -> miette::Result<()> {
        // An index built from a different grid.
        let built_from = parse_grid("ABA")?;
        let linked = Adjacency::link(&built_from);
        let index = RegionBuilder::new(&built_from, &linked).build();

        let grid = parse_grid("AAA")?;
        let adjacency = Adjacency::link(&grid);

        match validate(&grid, &adjacency, &index) {
            Err(GridError::InvariantViolation(InvariantViolationError::LabelMismatch {
                x: 1, ..
            })) => Ok(()),
            other => panic!("expected a label mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_split_region() -> miette::Result<()> {
        let built_from = parse_grid("AAA")?;
        let linked = Adjacency::link(&built_from);
        let index = RegionBuilder::new(&built_from, &linked).build();
        assert_eq!(Some(1), index.slots(&'A').map(<[Region]>::len));

        // Same labels, but the middle link is gone in this adjacency.
        let grid = parse_grid("AAA")?;
        let broken = Adjacency::link(&parse_grid("ABA")?);

        match validate(&grid, &broken, &index) {
            Err(GridError::InvariantViolation(InvariantViolationError::Disconnected {
                components: 3,
                ..
            })) => Ok(()),
            other => panic!("expected a disconnected region, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_non_maximal_regions() -> miette::Result<()> {
        let grid = parse_grid("AA")?;
        let adjacency = Adjacency::link(&grid);

        // Building against an adjacency that separates the two cells leaves
        // two A regions that should have been one.
        let split = Adjacency::link(&parse_grid("AB")?);
        let partial = RegionBuilder::new(&grid, &split).build();
        assert_eq!(2, partial.region_count());

        match validate(&grid, &adjacency, &partial) {
            Err(GridError::InvariantViolation(InvariantViolationError::NotMaximal { .. })) => {
                Ok(())
            }
            other => panic!("expected a non-maximal partition, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_stale_assignment() -> miette::Result<()> {
        let grid = parse_grid("ABABA\nABABA\nAAAAA")?;
        let adjacency = Adjacency::link(&grid);
        let mut index = RegionBuilder::new(&grid, &adjacency).build();
        validate(&grid, &adjacency, &index)?;

        // cell (2, 0) was migrated into slot 0; point it back at the emptied slot
        index.set_assignment(2, Some(1));

        match validate(&grid, &adjacency, &index) {
            Err(GridError::InvariantViolation(InvariantViolationError::StaleAssignment {
                x: 2,
                y: 0,
                recorded: Some(1),
                actual: 0,
            })) => Ok(()),
            other => panic!("expected a stale assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_unassigned_cell_before_connectivity() -> miette::Result<()> {
        let grid = parse_grid("AAA")?;
        let adjacency = Adjacency::link(&grid);
        let mut index = RegionBuilder::new(&grid, &adjacency).build();

        // dropping the middle cell also leaves the region split in two
        index.remove_cell(&'A', 0, 1);

        match validate(&grid, &adjacency, &index) {
            Err(GridError::InvariantViolation(InvariantViolationError::Unassigned {
                x: 1,
                y: 0,
            })) => Ok(()),
            other => panic!("expected an unassigned cell, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_duplicate_cell() -> miette::Result<()> {
        let grid = parse_grid("AB")?;
        let adjacency = Adjacency::link(&grid);
        let mut index = RegionBuilder::new(&grid, &adjacency).build();

        index.push_cell(&'B', 0, 0);

        match validate(&grid, &adjacency, &index) {
            Err(GridError::InvariantViolation(InvariantViolationError::DuplicateCell {
                x: 0,
                y: 0,
            })) => Ok(()),
            other => panic!("expected a duplicated cell, got {other:?}"),
        }
    }
}
