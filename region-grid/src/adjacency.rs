use tracing::debug;

use crate::direction::{Direction, DirectionSet};
use crate::grid::Grid;

/// Neighbour links and boundary directions for every cell of a grid.
///
/// A boundary direction is one where the neighbour is missing (grid edge) or
/// carries a different label. Both tables are indexed by cell index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<[Option<usize>; 4]>,
    boundaries: Vec<DirectionSet>,
}

impl Adjacency {
    #[tracing::instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
    pub fn link<T: PartialEq>(grid: &Grid<T>) -> Self {
        let mut neighbors = Vec::with_capacity(grid.len());
        let mut boundaries = Vec::with_capacity(grid.len());

        for (index, cell) in grid.cells().iter().enumerate() {
            let links = Direction::ALL.map(|direction| grid.neighbor_index(index, direction));
            let fenced = Direction::ALL
                .into_iter()
                .filter(|direction| match links[direction.index()] {
                    Some(neighbor) => grid.cell(neighbor).label != cell.label,
                    None => true,
                })
                .collect::<DirectionSet>();

            neighbors.push(links);
            boundaries.push(fenced);
        }

        debug!(
            boundary_edges = boundaries.iter().map(|b| b.len()).sum::<usize>(),
            "linked grid"
        );

        Self {
            neighbors,
            boundaries,
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        self.neighbors[index][direction.index()]
    }

    /// The neighbours that exist, clockwise from north.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.neighbor(index, direction)?)))
    }

    /// Neighbours on the same side of every boundary, i.e. carrying the same label.
    pub fn same_label_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let boundaries = self.boundaries[index];
        self.neighbors(index)
            .filter(move |(direction, _)| !boundaries.contains(*direction))
            .map(|(_, neighbor)| neighbor)
    }

    pub fn boundaries(&self, index: usize) -> DirectionSet {
        self.boundaries[index]
    }

    /// Fence segments this cell adds to its region's perimeter.
    pub fn perimeter_contribution(&self, index: usize) -> usize {
        self.boundaries[index].len()
    }
}
