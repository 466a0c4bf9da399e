use std::fmt;

use miette::{Context, Diagnostic, Result};
use region_grid::{parse_grid_with, Direction, DirectionSet, Grid, Position};
use thiserror::Error;
use tracing::{debug, trace};

mod constants {
    pub const OBSTACLE: char = '#';
    pub const OPEN: char = '.';
}

use constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Open,
    Obstacle,
    Guard(Direction),
}

impl Tile {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            OPEN => Some(Self::Open),
            OBSTACLE => Some(Self::Obstacle),
            _ => Direction::from_glyph(c).map(Self::Guard),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "{OPEN}"),
            Self::Obstacle => write!(f, "{OBSTACLE}"),
            Self::Guard(heading) => write!(f, "{heading}"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(code(day06::patrol_error))]
pub enum PatrolError {
    #[error("no guard found in the lab")]
    #[diagnostic(help("mark the guard's start with one of ^ > v <"))]
    MissingGuard,

    #[error("found {0} guards, expected exactly one")]
    MultipleGuards(usize),

    #[error("guard at ({x}, {y}) is boxed in by obstacles")]
    Boxed { x: usize, y: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    pub position: Position,
    pub heading: Direction,
}

/// How a patrol ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The guard walked off the grid. `visited` lists every cell stepped
    /// on, each once, in order of first visit.
    Exited { visited: Vec<Position> },
    /// The guard came back to a cell facing a direction it already had there.
    Looped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lab {
    grid: Grid<Tile>,
    guard: Guard,
}

impl Lab {
    pub fn parse(input: &str) -> Result<Self> {
        let mut grid = parse_grid_with(input, Tile::from_char).wrap_err("Failed to parse lab map")?;

        let guards = grid
            .cells()
            .iter()
            .filter_map(|cell| match cell.label {
                Tile::Guard(heading) => Some(Guard {
                    position: cell.position(),
                    heading,
                }),
                _ => None,
            })
            .collect::<Vec<_>>();

        let guard = match guards.as_slice() {
            [] => return Err(PatrolError::MissingGuard.into()),
            [guard] => *guard,
            many => return Err(PatrolError::MultipleGuards(many.len()).into()),
        };
        grid.set_label(guard.position, Tile::Open);

        debug!(
            width = grid.width(),
            height = grid.height(),
            ?guard,
            "parsed lab"
        );
        Ok(Self { grid, guard })
    }

    pub fn grid(&self) -> &Grid<Tile> {
        &self.grid
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    fn is_blocked(&self, position: Position, extra: Option<Position>) -> bool {
        extra == Some(position) || self.grid.label(position) == Some(&Tile::Obstacle)
    }

    /// Walks the guard until it leaves the grid or repeats itself. The guard
    /// steps forward when it can and turns right when the way is blocked.
    /// `extra` is one more obstacle to consider on top of the map.
    pub fn patrol(&self, extra: Option<Position>) -> Result<Outcome, PatrolError> {
        let mut guard = self.guard;
        let mut seen = vec![DirectionSet::EMPTY; self.grid.len()];
        let mut visited = Vec::new();

        loop {
            let Some(cell) = self.grid.index_of(guard.position) else {
                break;
            };
            if seen[cell].is_empty() {
                visited.push(guard.position);
            }
            if !seen[cell].insert(guard.heading) {
                trace!(?guard, steps = visited.len(), "patrol loops");
                return Ok(Outcome::Looped);
            }

            let mut turns = 0;
            loop {
                match self.grid.step(guard.position, guard.heading) {
                    None => return Ok(Outcome::Exited { visited }),
                    Some(next) if self.is_blocked(next, extra) => {
                        guard.heading = guard.heading.clockwise();
                        turns += 1;
                        if turns == 4 {
                            return Err(PatrolError::Boxed {
                                x: guard.position.x,
                                y: guard.position.y,
                            });
                        }
                    }
                    Some(next) => {
                        guard.position = next;
                        break;
                    }
                }
            }
        }

        Ok(Outcome::Exited { visited })
    }

    /// The cells of the unobstructed patrol, in order of first visit.
    pub fn route(&self) -> Result<Vec<Position>> {
        match self.patrol(None).wrap_err("Failed to walk the patrol")? {
            Outcome::Exited { visited } => Ok(visited),
            Outcome::Looped => Err(miette::miette!("The unobstructed patrol never leaves the lab")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EXAMPLE: &str = "....#.....
.........#
..........
..#.......
.......#..
..........
.#..^.....
........#.
#.........
......#...";

    #[test]
    fn test_parse_lab() -> miette::Result<()> {
        let lab = Lab::parse(EXAMPLE)?;
        assert_eq!(
            Guard {
                position: Position::new(4, 6),
                heading: Direction::North
            },
            lab.guard()
        );
        assert_eq!(Some(&Tile::Open), lab.grid().label(Position::new(4, 6)));
        assert_eq!(Some(&Tile::Obstacle), lab.grid().label(Position::new(4, 0)));
        Ok(())
    }

    #[test]
    fn test_display_without_guard() -> miette::Result<()> {
        let lab = Lab::parse(".#\n>.")?;
        assert_eq!(".#\n..\n", lab.grid().to_string());
        assert_eq!(Direction::East, lab.guard().heading);
        Ok(())
    }

    #[test]
    fn test_route() -> miette::Result<()> {
        let lab = Lab::parse(EXAMPLE)?;
        let route = lab.route()?;
        assert_eq!(41, route.len());
        assert_eq!(Position::new(4, 6), route[0]);
        Ok(())
    }

    #[rstest]
    #[case::straight_out("..^..", 1)]
    #[case::turn_right("#..\n^..", 3)]
    #[case::facing_west("...<", 4)]
    fn test_short_routes(#[case] input: &str, #[case] expected: usize) -> miette::Result<()> {
        let lab = Lab::parse(input)?;
        assert_eq!(expected, lab.route()?.len());
        Ok(())
    }

    #[test]
    fn test_extra_obstacle_loops() -> miette::Result<()> {
        let lab = Lab::parse(EXAMPLE)?;
        assert_eq!(Outcome::Looped, lab.patrol(Some(Position::new(3, 6)))?);
        assert!(matches!(
            lab.patrol(Some(Position::new(0, 0)))?,
            Outcome::Exited { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_boxed_guard() -> miette::Result<()> {
        let lab = Lab::parse(".#.\n#^#\n.#.")?;
        assert!(matches!(
            lab.patrol(None),
            Err(PatrolError::Boxed { x: 1, y: 1 })
        ));
        Ok(())
    }

    #[rstest]
    #[case::no_guard("...\n.#.")]
    #[case::two_guards("^..\n..v")]
    #[case::unknown_tile("..^\n.x.")]
    fn test_parse_errors(#[case] input: &str) {
        assert!(Lab::parse(input).is_err());
    }
}
