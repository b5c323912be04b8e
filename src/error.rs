use thiserror::Error;

use crate::barcode::Symbology;

/// Why a code was refused for the selected format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no barcode format selected")]
    MissingFormat,
    #[error("unknown barcode format `{0}`")]
    UnknownFormat(String),
    #[error("the code is empty")]
    EmptyCode,
    #[error("{0} only accepts digits")]
    NonNumeric(Symbology),
    #[error("{format} requires {} digits, got {len}", .format.length_hint())]
    BadLength { format: Symbology, len: usize },
    #[error("the code has 14 digits; select the ITF14 (EAN-14) format")]
    WrongSymbologyForLength,
}

/// Problem found in a single row before anything is drawn for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordFault {
    #[error("field `{0}` is empty")]
    MissingField(&'static str),
    #[error("quantity must be a positive integer")]
    InvalidQuantity,
    #[error(transparent)]
    Code(#[from] ValidationError),
}

/// Raised by a rasterizer that cannot encode the data in the requested format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{format} cannot encode character {ch:?}")]
    InvalidCharacter { format: Symbology, ch: char },
    #[error("{format} cannot encode {len} characters")]
    InvalidLength { format: Symbology, len: usize },
    #[error("{format} check digit should be {expected}, found {found}")]
    BadCheckDigit { format: Symbology, expected: u8, found: u8 },
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    Format(#[from] ValidationError),
    #[error("there are no rows to print")]
    EmptyInput,
    #[error("label grid of {columns} x {rows} cells holds no labels")]
    EmptyGrid { columns: u32, rows: u32 },
    #[error("row {row}: {reason}")]
    InvalidRecord { row: usize, reason: RecordFault },
    #[error("row {row}: could not generate code \"{code}\" ({format})")]
    RenderError {
        row: usize,
        code: String,
        format: Symbology,
        #[source]
        source: EncodeError,
    },
    #[error("failed to load font: {0}")]
    Font(String),
    #[error("failed to write PDF: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    /// 1-based index of the offending row, when the error belongs to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            LayoutError::InvalidRecord { row, .. } | LayoutError::RenderError { row, .. } => Some(*row),
            _ => None,
        }
    }
}
