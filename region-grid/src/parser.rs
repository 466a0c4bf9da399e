use nom::{
    character::complete::{line_ending, multispace0, satisfy, space0},
    combinator::map_opt,
    multi::{many1, separated_list1},
    sequence::{delimited, tuple},
    IResult, Slice,
};
use nom_locate::{position, LocatedSpan};
use tracing::debug;

use crate::error::{GridError, MalformedInputError, MalformedKind};
use crate::grid::Grid;

type Span<'a> = LocatedSpan<&'a str>;

#[derive(Debug)]
struct LocatedRow<'a, T> {
    start: Span<'a>,
    end: Span<'a>,
    labels: Vec<T>,
}

/// Parses a grid where every non-whitespace character is its own label.
pub fn parse_grid(input: &str) -> Result<Grid<char>, GridError> {
    parse_grid_with(input, Some)
}

/// Parses a grid, turning each character into a label with `decode`.
///
/// Lines are trimmed and surrounding blank lines ignored. Rows of unequal
/// width, characters `decode` rejects, and gaps inside the grid are all
/// reported as [`MalformedInputError`] pointing into the source text.
#[tracing::instrument(skip_all, fields(len = input.len()))]
pub fn parse_grid_with<T, F>(input: &str, decode: F) -> Result<Grid<T>, GridError>
where
    F: Fn(char) -> Option<T>,
{
    let rows = match parse_rows(Span::new(input), &decode) {
        Ok((rest, rows)) if rest.fragment().is_empty() => rows,
        Ok((rest, _)) => return Err(unexpected(input, rest, &decode).into()),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            return Err(unexpected(input, e.input, &decode).into())
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(MalformedInputError::new(input, (0, input.len()), MalformedKind::Empty).into())
        }
    };

    let expected = rows[0].labels.len();
    if let Some(ragged) = rows.iter().find(|row| row.labels.len() != expected) {
        let offset = ragged.start.location_offset();
        let len = ragged.end.location_offset() - offset;
        return Err(MalformedInputError::new(
            input,
            (offset, len),
            MalformedKind::RaggedRow {
                line: ragged.start.location_line(),
                expected,
                found: ragged.labels.len(),
            },
        )
        .into());
    }

    let grid = Grid::from_rows(rows.into_iter().map(|row| row.labels).collect());
    debug!(width = grid.width(), height = grid.height(), "parsed grid");
    Ok(grid)
}

/// Classifies whatever the row parser stopped at.
fn unexpected<T, F>(src: &str, rest: Span, decode: &F) -> MalformedInputError
where
    F: Fn(char) -> Option<T>,
{
    let fragment = rest.fragment();
    let offset = rest.location_offset() + (fragment.len() - fragment.trim_start().len());

    let Some(found) = src[offset..].chars().next() else {
        return MalformedInputError::new(src, (0, src.len()), MalformedKind::Empty);
    };

    let at = Span::new(src).slice(offset..);
    let line = at.location_line();
    let column = at.get_utf8_column();
    let kind = if decode(found).is_some() {
        MalformedKind::Gap { line, column }
    } else {
        MalformedKind::InvalidCell {
            found,
            line,
            column,
        }
    };

    MalformedInputError::new(src, (offset, found.len_utf8()), kind)
}

fn parse_rows<'a, T, F>(input: Span<'a>, decode: &F) -> IResult<Span<'a>, Vec<LocatedRow<'a, T>>>
where
    F: Fn(char) -> Option<T>,
{
    delimited(
        multispace0,
        separated_list1(line_ending, |i| parse_row(i, decode)),
        multispace0,
    )(input)
}

fn parse_row<'a, T, F>(input: Span<'a>, decode: &F) -> IResult<Span<'a>, LocatedRow<'a, T>>
where
    F: Fn(char) -> Option<T>,
{
    let (input, (_, start, labels, end, _)) = tuple((
        space0,
        position,
        many1(|i| parse_cell(i, decode)),
        position,
        space0,
    ))(input)?;
    Ok((input, LocatedRow { start, end, labels }))
}

fn parse_cell<'a, T, F>(input: Span<'a>, decode: &F) -> IResult<Span<'a>, T>
where
    F: Fn(char) -> Option<T>,
{
    map_opt(satisfy(|c: char| !c.is_whitespace()), decode)(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use rstest::rstest;

    fn malformed_kind<T: std::fmt::Debug>(result: Result<Grid<T>, GridError>) -> MalformedKind {
        match result {
            Err(GridError::MalformedInput(e)) => e.kind,
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_grid() -> miette::Result<()> {
        let grid = parse_grid("AB\nCD")?;

        assert_eq!(2, grid.width());
        assert_eq!(2, grid.height());

        let cells = grid
            .cells()
            .iter()
            .map(|cell| (cell.x, cell.y, cell.label))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![(0, 0, 'A'), (1, 0, 'B'), (0, 1, 'C'), (1, 1, 'D')],
            cells
        );
        Ok(())
    }

    #[rstest]
    #[case::trailing_newline("AB\nCD\n")]
    #[case::crlf("AB\r\nCD\r\n")]
    #[case::indented("  AB  \n\tCD")]
    #[case::surrounding_blank_lines("\n\nAB\nCD\n\n")]
    fn test_parse_trims(#[case] input: &str) -> miette::Result<()> {
        let grid = parse_grid(input)?;
        assert_eq!("AB\nCD\n", grid.to_string());
        Ok(())
    }

    #[test]
    fn test_parse_with_decoder() -> miette::Result<()> {
        let grid = parse_grid_with("012\n345", |c| c.to_digit(10))?;
        assert_eq!(Some(&4), grid.label(Position::new(1, 1)));
        Ok(())
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace_only("  \n \n")]
    fn test_empty_input(#[case] input: &str) {
        assert_eq!(MalformedKind::Empty, malformed_kind(parse_grid(input)));
    }

    #[rstest]
    #[case::second_line("AAAA\nBBB\nCCCC", 2)]
    #[case::after_leading_blank_lines("\n\nAAAA\nBBBB\nCCC", 5)]
    fn test_ragged_rows_are_rejected(#[case] input: &str, #[case] line: u32) {
        let kind = malformed_kind(parse_grid(input));
        assert_eq!(
            MalformedKind::RaggedRow {
                line,
                expected: 4,
                found: 3
            },
            kind
        );
    }

    #[test]
    fn test_ragged_row_span() {
        match parse_grid("AAAA\nBBBBB") {
            Err(GridError::MalformedInput(e)) => {
                assert_eq!(5, e.span.offset());
                assert_eq!(5, e.span.len());
            }
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_character() {
        let kind = malformed_kind(parse_grid_with("012\n3x5", |c| c.to_digit(10)));
        assert_eq!(
            MalformedKind::InvalidCell {
                found: 'x',
                line: 2,
                column: 2
            },
            kind
        );
    }

    #[test]
    fn test_rejected_first_character() {
        let kind = malformed_kind(parse_grid_with("a12", |c| c.to_digit(10)));
        assert_eq!(
            MalformedKind::InvalidCell {
                found: 'a',
                line: 1,
                column: 1
            },
            kind
        );
    }

    #[rstest]
    #[case::blank_line("AB\n\nCD", 3, 1)]
    #[case::space_inside_row("AB CD\nABCD", 1, 4)]
    fn test_gaps(#[case] input: &str, #[case] line: u32, #[case] column: usize) {
        assert_eq!(MalformedKind::Gap { line, column }, malformed_kind(parse_grid(input)));
    }
}
