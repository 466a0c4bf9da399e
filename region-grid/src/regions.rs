use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::adjacency::Adjacency;
use crate::grid::Grid;

/// Order in which [`RegionBuilder`] visits cells.
///
/// Every order produces the same partition; only region numbering differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitOrder {
    #[default]
    RowMajor,
    ColumnMajor,
    ReverseRowMajor,
}

impl VisitOrder {
    fn indices(self, width: usize, height: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            Self::RowMajor => Box::new(0..width * height),
            Self::ColumnMajor => Box::new(
                (0..width)
                    .cartesian_product(0..height)
                    .map(move |(x, y)| y * width + x),
            ),
            Self::ReverseRowMajor => Box::new((0..width * height).rev()),
        }
    }
}

/// One region slot. A slot emptied by a merge stays in place so later
/// slot numbers remain valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    cells: Vec<usize>,
}

impl Region {
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn is_tombstone(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A live region together with the label and slot it lives under.
#[derive(Debug, Clone, Copy)]
pub struct RegionRef<'a, T> {
    pub label: &'a T,
    pub index: usize,
    pub region: &'a Region,
}

impl<T> RegionRef<'_, T> {
    pub fn cells(&self) -> &[usize] {
        self.region.cells()
    }

    pub fn area(&self) -> usize {
        self.region.area()
    }
}

/// Region slots grouped per label, plus the slot each cell belongs to.
#[derive(Debug, Clone)]
pub struct RegionIndex<T> {
    labels: Vec<T>,
    slots: HashMap<T, Vec<Region>>,
    assignment: Vec<Option<usize>>,
    merges: usize,
}

impl<T: Clone + Eq + Hash> RegionIndex<T> {
    fn new(cells: usize) -> Self {
        Self {
            labels: Vec::new(),
            slots: HashMap::new(),
            assignment: vec![None; cells],
            merges: 0,
        }
    }

    /// Labels in the order they were first encountered.
    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// Every slot for `label`, tombstones included.
    pub fn slots(&self, label: &T) -> Option<&[Region]> {
        self.slots.get(label).map(Vec::as_slice)
    }

    /// Slot number of the region holding cell `index`.
    pub fn region_of(&self, index: usize) -> Option<usize> {
        self.assignment[index]
    }

    /// Live regions, label by label in first-seen order.
    pub fn regions(&self) -> impl Iterator<Item = RegionRef<'_, T>> {
        self.labels.iter().flat_map(move |label| {
            self.slots[label]
                .iter()
                .enumerate()
                .filter(|(_, region)| !region.is_tombstone())
                .map(move |(index, region)| RegionRef {
                    label,
                    index,
                    region,
                })
        })
    }

    pub fn region_count(&self) -> usize {
        self.regions().count()
    }

    /// How many times separate regions were folded together while building.
    pub fn merges(&self) -> usize {
        self.merges
    }

    fn open_region(&mut self, label: &T, cell: usize) -> usize {
        let slots = self.slots.entry(label.clone()).or_insert_with(|| {
            self.labels.push(label.clone());
            Vec::new()
        });
        slots.push(Region { cells: vec![cell] });
        let slot = slots.len() - 1;
        self.assignment[cell] = Some(slot);
        slot
    }

    /// Places `cell` into the lowest of `adjacent` and folds every other
    /// listed region into it. `adjacent` must be sorted and free of duplicates.
    fn join(&mut self, label: &T, cell: usize, adjacent: &[usize]) {
        let Some((&keep, rest)) = adjacent.split_first() else {
            return;
        };
        let Some(slots) = self.slots.get_mut(label) else {
            return;
        };

        slots[keep].cells.push(cell);
        self.assignment[cell] = Some(keep);

        for &absorbed in rest.iter().rev() {
            let moved = std::mem::take(&mut slots[absorbed].cells);
            trace!(keep, absorbed, cells = moved.len(), "merging regions");
            for &migrated in &moved {
                self.assignment[migrated] = Some(keep);
            }
            slots[keep].cells.extend(moved);
            self.merges += 1;
        }
    }
}

#[cfg(test)]
impl<T: Clone + Eq + Hash> RegionIndex<T> {
    pub(crate) fn set_assignment(&mut self, cell: usize, slot: Option<usize>) {
        self.assignment[cell] = slot;
    }

    pub(crate) fn remove_cell(&mut self, label: &T, slot: usize, cell: usize) {
        if let Some(slots) = self.slots.get_mut(label) {
            slots[slot].cells.retain(|&c| c != cell);
        }
    }

    pub(crate) fn push_cell(&mut self, label: &T, slot: usize, cell: usize) {
        if let Some(slots) = self.slots.get_mut(label) {
            slots[slot].cells.push(cell);
        }
    }
}

/// Groups cells into maximal connected same-label regions in a single pass.
#[derive(Debug, Clone, Copy)]
pub struct RegionBuilder<'g, T> {
    grid: &'g Grid<T>,
    adjacency: &'g Adjacency,
    order: VisitOrder,
}

impl<'g, T: Clone + Eq + Hash> RegionBuilder<'g, T> {
    pub fn new(grid: &'g Grid<T>, adjacency: &'g Adjacency) -> Self {
        Self {
            grid,
            adjacency,
            order: VisitOrder::default(),
        }
    }

    pub fn with_order(mut self, order: VisitOrder) -> Self {
        self.order = order;
        self
    }

    /// Visits every cell once. A cell starts a new region when none of its
    /// same-label neighbours is labelled yet, joins the region when exactly
    /// one is, and merges all of them into the lowest slot otherwise.
    #[tracing::instrument(skip_all, fields(order = ?self.order))]
    pub fn build(&self) -> RegionIndex<T> {
        let mut index = RegionIndex::new(self.grid.len());

        for cell in self.order.indices(self.grid.width(), self.grid.height()) {
            let label = &self.grid.cell(cell).label;

            let adjacent = self
                .adjacency
                .same_label_neighbors(cell)
                .filter_map(|neighbor| index.assignment[neighbor])
                .sorted_unstable()
                .dedup()
                .collect::<Vec<_>>();

            if adjacent.is_empty() {
                index.open_region(label, cell);
            } else {
                index.join(label, cell, &adjacent);
            }
        }

        debug!(
            labels = index.labels.len(),
            regions = index.region_count(),
            merges = index.merges,
            "built regions"
        );
        index
    }
}
