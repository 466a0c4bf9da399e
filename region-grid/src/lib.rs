//! Grid region labelling.
//!
//! The pipeline runs in four stages, each consuming the output of the last:
//! [`parse_grid`] turns text into a [`Grid`], [`Adjacency::link`] records
//! neighbours and boundary directions for every cell, [`RegionBuilder`]
//! groups cells into connected same-label [`Region`]s, and [`measure`]
//! computes area, perimeter and corner counts per region.

pub mod adjacency;
pub mod direction;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod parser;
pub mod regions;
pub mod validate;

pub use adjacency::Adjacency;
pub use direction::{Direction, DirectionSet};
pub use error::{GridError, InvariantViolationError, MalformedInputError, MalformedKind};
pub use grid::{Cell, Grid, Position};
pub use metrics::{fence_prices, measure, FencePrices, RegionMetrics};
pub use parser::{parse_grid, parse_grid_with};
pub use regions::{Region, RegionBuilder, RegionIndex, RegionRef, VisitOrder};
pub use validate::validate;
