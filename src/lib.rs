//! Barcode label sheets for A4 adhesive stock.
//! - Validates product codes per symbology (EAN-13, EAN-8, ITF-14, UPC-A, CODE128)
//! - Completes 12 digit EAN-13 codes with their check digit
//! - Rasterizes one barcode per row and lays a 2 x 5 grid of labels per page
//! - Writes the sheet through any [`LabelCanvas`]; [`PdfCanvas`] produces the PDF

pub mod barcode;
pub mod builder;
pub mod consts;
pub mod error;
pub mod graphics;
pub mod metrics;
pub mod pdf;
pub mod record;

pub use barcode::{checksum, normalize, parse_format, validate, Symbology};
pub use builder::{layout, Align, CommandLog, DrawCommand, FontWeight, GridConfig, LabelCanvas, LayoutSummary};
pub use error::{EncodeError, LayoutError, RecordFault, ValidationError};
pub use graphics::{render_barcode, BarcodeRasterizer, Rasterizer, RenderOptions};
pub use pdf::{output_file_name, PdfCanvas};
pub use record::{LabelRecord, RawRow};

/// Lay out table rows as a label sheet.
///
/// The format is checked before the rows, then rows are validated one by one
/// as they are placed; the first failure aborts the run.
pub fn build_sheet<R, C>(
    rows: &[RawRow],
    format: Option<&str>,
    title: &str,
    cfg: &GridConfig,
    rasterizer: &mut R,
    canvas: &mut C,
) -> Result<LayoutSummary, LayoutError>
where
    R: Rasterizer + ?Sized,
    C: LabelCanvas + ?Sized,
{
    let format = parse_format(format)?;
    let records: Vec<LabelRecord> = rows.iter().map(LabelRecord::from).collect();
    layout(&records, format, title, cfg, rasterizer, canvas)
}
