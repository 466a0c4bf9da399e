use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GridError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvariantViolation(#[from] InvariantViolationError),
}

/// What exactly was wrong with the grid text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("input contains no grid rows")]
    Empty,

    #[error("line {line} has {found} cells but the first row has {expected}")]
    RaggedRow {
        line: u32,
        expected: usize,
        found: usize,
    },

    #[error("unexpected character {found:?} on line {line}, column {column}")]
    InvalidCell {
        found: char,
        line: u32,
        column: usize,
    },

    #[error("unexpected gap in the grid at line {line}, column {column}")]
    Gap { line: u32, column: usize },
}

#[derive(Debug, Error, Diagnostic)]
#[error("malformed grid input: {kind}")]
#[diagnostic(
    code(region_grid::malformed_input),
    help("the grid must be non-empty, rectangular, and one row per line")
)]
pub struct MalformedInputError {
    #[source_code]
    pub src: String,
    #[label("here")]
    pub span: SourceSpan,
    pub kind: MalformedKind,
}

impl MalformedInputError {
    pub fn new(src: &str, span: impl Into<SourceSpan>, kind: MalformedKind) -> Self {
        Self {
            src: src.to_string(),
            span: span.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[diagnostic(code(region_grid::invariant_violation))]
pub enum InvariantViolationError {
    #[error("cell ({x}, {y}) is not assigned to any live region")]
    Unassigned { x: usize, y: usize },

    #[error("cell ({x}, {y}) appears in more than one region")]
    DuplicateCell { x: usize, y: usize },

    #[error("cell ({x}, {y}) is recorded in slot {recorded:?} but held by slot {actual}")]
    StaleAssignment {
        x: usize,
        y: usize,
        recorded: Option<usize>,
        actual: usize,
    },

    #[error("region {index} of label {label} holds cell ({x}, {y}) with label {found}")]
    LabelMismatch {
        label: String,
        index: usize,
        found: String,
        x: usize,
        y: usize,
    },

    #[error("region {index} of label {label} splits into {components} disconnected parts")]
    Disconnected {
        label: String,
        index: usize,
        components: usize,
    },

    #[error("adjacent cells ({x}, {y}) and ({nx}, {ny}) share label {label} but sit in different regions")]
    NotMaximal {
        label: String,
        x: usize,
        y: usize,
        nx: usize,
        ny: usize,
    },
}
