use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use miette::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use region_grid::{parse_grid_with, Adjacency, Grid, Position};
use tracing::debug;

mod constants {
    pub const TRAILHEAD: u8 = 0;
    pub const PEAK: u8 = 9;
    pub const IMPASSABLE: char = '.';
}

use constants::*;

/// A height from `0` to `9`, or `None` for ground nobody can walk on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Height(pub Option<u8>);

impl Height {
    fn from_char(c: char) -> Option<Self> {
        match c {
            IMPASSABLE => Some(Self(None)),
            _ => c.to_digit(10).map(|d| Self(Some(d as u8))),
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(h) => write!(f, "{h}"),
            None => write!(f, "{IMPASSABLE}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrailSummary {
    pub trailheads: usize,
    /// Distinct peaks reachable, summed over trailheads.
    pub score: usize,
    /// Distinct hiking trails, summed over trailheads.
    pub rating: usize,
}

/// Topographic map with an edge from every cell to each neighbour exactly
/// one step higher. Node indices equal cell indices.
#[derive(Debug, Clone)]
pub struct TrailMap {
    grid: Grid<Height>,
    graph: DiGraph<Position, ()>,
}

impl TrailMap {
    pub fn parse(input: &str) -> Result<Self> {
        let grid =
            parse_grid_with(input, Height::from_char).wrap_err("Failed to parse topographic map")?;
        let adjacency = Adjacency::link(&grid);

        let mut graph = DiGraph::with_capacity(grid.len(), grid.len() * 2);
        for cell in grid.cells() {
            graph.add_node(cell.position());
        }

        for (index, cell) in grid.cells().iter().enumerate() {
            let Height(Some(height)) = cell.label else {
                continue;
            };
            for (_, neighbor) in adjacency.neighbors(index) {
                if grid.cell(neighbor).label == Height(Some(height + 1)) {
                    graph.add_edge(NodeIndex::new(index), NodeIndex::new(neighbor), ());
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "linked uphill steps"
        );
        Ok(Self { grid, graph })
    }

    pub fn grid(&self) -> &Grid<Height> {
        &self.grid
    }

    pub fn graph(&self) -> &DiGraph<Position, ()> {
        &self.graph
    }

    fn height(&self, node: NodeIndex) -> Option<u8> {
        self.grid.cell(node.index()).label.0
    }

    /// Score and rating for each trailhead, in reading order.
    ///
    /// Cells are handled from the peaks downwards so every uphill neighbour
    /// is complete before the cell below it reads from it.
    pub fn trailheads(&self) -> Vec<(Position, usize, usize)> {
        let count = self.graph.node_count();
        let mut peaks: Vec<HashSet<NodeIndex>> = vec![HashSet::new(); count];
        let mut trails = vec![0usize; count];

        let descending = self
            .graph
            .node_indices()
            .filter_map(|node| self.height(node).map(|h| (node, h)))
            .sorted_by_key(|&(_, h)| std::cmp::Reverse(h));

        for (node, height) in descending {
            if height == PEAK {
                peaks[node.index()].insert(node);
                trails[node.index()] = 1;
                continue;
            }
            for uphill in self.graph.neighbors(node) {
                let reachable = peaks[uphill.index()].clone();
                peaks[node.index()].extend(reachable);
                trails[node.index()] += trails[uphill.index()];
            }
        }

        self.graph
            .node_indices()
            .filter(|&node| self.height(node) == Some(TRAILHEAD))
            .map(|node| {
                (
                    self.graph[node],
                    peaks[node.index()].len(),
                    trails[node.index()],
                )
            })
            .collect()
    }

    pub fn summarize(&self) -> TrailSummary {
        self.trailheads()
            .into_iter()
            .fold(TrailSummary::default(), |acc, (_, score, rating)| TrailSummary {
                trailheads: acc.trailheads + 1,
                score: acc.score + score,
                rating: acc.rating + rating,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::visit::EdgeRef;

    const EXAMPLE: &str = "89010123
78121874
87430965
96549874
45678903
32019012
01329801
10456732";

    #[test]
    fn test_graph_creation() -> Result<()> {
        let map = TrailMap::parse("12\n34")?;

        assert_eq!(4, map.graph().node_count(), "Should have 4 nodes");
        assert_eq!(2, map.graph().edge_count(), "Should have 2 edges");
        Ok(())
    }

    #[test]
    fn test_edge_directions() -> Result<()> {
        let map = TrailMap::parse("123\n654")?;
        let graph = map.graph();

        assert_eq!(5, graph.edge_count(), "Expected 5 edges in the graph");

        for edge in graph.edge_references() {
            let from = map.height(edge.source());
            let to = map.height(edge.target());
            assert_eq!(from.map(|h| h + 1), to, "edge must climb by one");
        }
        Ok(())
    }

    #[test]
    fn test_impassable_cells_have_no_edges() -> Result<()> {
        let map = TrailMap::parse("0.2\n123")?;
        let blocked = NodeIndex::new(1);
        assert_eq!(None, map.height(blocked));
        assert_eq!(0, map.graph().neighbors(blocked).count());
        assert_eq!("0.2\n123\n", map.grid().to_string());
        Ok(())
    }

    #[test_log::test]
    fn test_summary() -> Result<()> {
        let map = TrailMap::parse(EXAMPLE)?;
        assert_eq!(
            TrailSummary {
                trailheads: 9,
                score: 36,
                rating: 81
            },
            map.summarize()
        );
        Ok(())
    }

    #[test]
    fn test_trailhead_scores() -> Result<()> {
        let map = TrailMap::parse(EXAMPLE)?;
        let scores = map
            .trailheads()
            .into_iter()
            .map(|(_, score, _)| score)
            .collect::<Vec<_>>();
        assert_eq!(vec![5, 6, 5, 3, 1, 3, 5, 3, 5], scores);
        Ok(())
    }

    #[test]
    fn test_single_path() -> Result<()> {
        let map = TrailMap::parse("0123\n1234\n8765\n9876")?;
        let trailheads = map.trailheads();

        assert_eq!(1, trailheads.len(), "Expected 1 trailhead");
        assert_eq!(Position::new(0, 0), trailheads[0].0);
        assert_eq!(1, trailheads[0].1);
        Ok(())
    }

    #[test]
    fn test_rejects_letters() {
        assert!(TrailMap::parse("012\n3a4").is_err());
    }
}
