// Sheet and label tuning constants. Lengths are centimetres unless noted.

// A4 portrait
pub const PAGE_W: f32 = 21.0;
pub const PAGE_H: f32 = 29.7;

pub const MARGIN_LEFT: f32 = 1.5;
pub const MARGIN_TOP: f32 = 0.5;
pub const LABEL_W: f32 = 9.0;
pub const LABEL_H: f32 = 5.65;
pub const COLUMNS: u32 = 2;
pub const ROWS_PER_PAGE: u32 = 5;

// Frame
pub const FRAME_GRAY: u8 = 160;
pub const FRAME_LINE_W: f32 = 0.05;

// Font sizes (pt)
pub const TITLE_PT: f32 = 13.0;
pub const FIELD_PT: f32 = 10.0;
pub const CAPTION_PT: f32 = 13.0;

// Offsets inside a cell, measured from its top-left corner
pub const TITLE_Y: f32 = 0.9;
pub const FIELD_LABEL_X: f32 = 0.6;
pub const FIELD_VALUE_X: f32 = 2.8;
pub const FIRST_LINE_Y: f32 = 1.9;
pub const SECOND_LINE_Y: f32 = 2.45;
pub const PO_LABEL_FROM_RIGHT: f32 = 2.6;
pub const PO_VALUE_FROM_RIGHT: f32 = 0.5;
pub const BARCODE_SIDE_MARGIN: f32 = 0.7;
pub const BARCODE_Y: f32 = 2.8;
pub const BARCODE_H: f32 = 1.8;
pub const CAPTION_BELOW_BARCODE: f32 = 2.35;

pub const BRANCH_LABEL: &str = "SUCURSAL:";
pub const AREA_LABEL: &str = "ÁREA:";
pub const PO_LABEL: &str = "O/C:";

// Rasterizer settings (pixels)
pub const NARROW: u32 = 2;       // module width
pub const HEIGHT: u32 = 60;      // bar height
pub const QUIET: u32 = 0;        // margin around the symbol

pub const ITF_WIDE: u32 = 3;     // wide:narrow ratio for interleaved 2 of 5
