use std::fmt;

use itertools::Itertools;

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A single grid square. Position is fixed at parse time, the label is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell<T> {
    pub x: usize,
    pub y: usize,
    pub label: T,
}

impl<T> Cell<T> {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A rectangular grid of labelled cells, stored row-major.
///
/// A cell's index is `y * width + x`; every other structure in this crate
/// refers to cells by that index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<Cell<T>>,
}

impl<T> Grid<T> {
    /// Builds a grid from rows that are already known to be rectangular.
    pub(crate) fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells = rows
            .into_iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.into_iter()
                    .enumerate()
                    .map(move |(x, label)| Cell { x, y, label })
            })
            .collect();

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> &Cell<T> {
        &self.cells[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell<T>]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        (position.x < self.width && position.y < self.height)
            .then(|| position.y * self.width + position.x)
    }

    pub fn position_of(&self, index: usize) -> Position {
        self.cells[index].position()
    }

    pub fn get(&self, position: Position) -> Option<&Cell<T>> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    pub fn label(&self, position: Position) -> Option<&T> {
        self.get(position).map(|cell| &cell.label)
    }

    /// Replaces the label at `position`, returning the old one.
    pub fn set_label(&mut self, position: Position, label: T) -> Option<T> {
        let index = self.index_of(position)?;
        Some(std::mem::replace(&mut self.cells[index].label, label))
    }

    /// The position one step away in `direction`, if it is still on the grid.
    pub fn step(&self, position: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = position.x.checked_add_signed(dx)?;
        let y = position.y.checked_add_signed(dy)?;
        (x < self.width && y < self.height).then_some(Position { x, y })
    }

    /// Index of the neighbour of cell `index` in `direction`.
    pub fn neighbor_index(&self, index: usize, direction: Direction) -> Option<usize> {
        self.step(self.position_of(index), direction)
            .and_then(|position| self.index_of(position))
    }

    /// Converts every label, keeping positions and shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .into_iter()
                .map(|Cell { x, y, label }| Cell { x, y, label: f(label) })
                .collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row.iter().map(|cell| &cell.label).join(""))?;
        }
        Ok(())
    }
}
