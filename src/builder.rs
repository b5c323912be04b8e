use image::GrayImage;

use crate::barcode::{normalize, Symbology};
use crate::consts::*;
use crate::error::LayoutError;
use crate::graphics::{Rasterizer, RenderOptions};
use crate::record::LabelRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Drawing surface the sheet is written to.
///
/// Coordinates are centimetres from the top-left corner of the current page;
/// `text` positions are baselines.
pub trait LabelCanvas {
    /// Stroke colour as a grey level, 0 = black.
    fn set_stroke_gray(&mut self, level: u8);
    fn set_line_width(&mut self, width: f32);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn set_font(&mut self, weight: FontWeight);
    fn set_font_size(&mut self, size_pt: f32);
    fn text(&mut self, content: &str, x: f32, y: f32, align: Align);
    fn image(&mut self, img: &GrayImage, x: f32, y: f32, w: f32, h: f32);
    fn add_page(&mut self);
}

/// Fixed grid of label cells repeated on every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub margin_left: f32,
    pub margin_top: f32,
    pub cell_w: f32,
    pub cell_h: f32,
    pub columns: u32,
    pub rows_per_page: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            margin_left: MARGIN_LEFT,
            margin_top: MARGIN_TOP,
            cell_w: LABEL_W,
            cell_h: LABEL_H,
            columns: COLUMNS,
            rows_per_page: ROWS_PER_PAGE,
        }
    }
}

impl GridConfig {
    pub fn labels_per_page(&self) -> u32 {
        self.columns * self.rows_per_page
    }

    /// A grid needs at least one column and one row per page.
    pub fn check(&self) -> Result<(), LayoutError> {
        if self.labels_per_page() == 0 {
            return Err(LayoutError::EmptyGrid { columns: self.columns, rows: self.rows_per_page });
        }
        Ok(())
    }

    /// Top-left corner of the cell holding the `k`-th label of a run.
    ///
    /// `k` starts at 1; 0 is treated as 1. Panics on a grid refused by [`GridConfig::check`].
    pub fn cell_origin(&self, k: u32) -> (f32, f32) {
        let on_page = k.saturating_sub(1) % self.labels_per_page();
        let col = on_page % self.columns;
        let row = on_page / self.columns;
        (
            self.margin_left + col as f32 * self.cell_w,
            self.margin_top + row as f32 * self.cell_h,
        )
    }
}

/// Where the next label goes. Lives for a single `layout` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
    /// Physical labels placed so far in this run.
    pub placed: u32,
}

impl Cursor {
    pub fn new(cfg: &GridConfig) -> Self {
        Self { x: cfg.margin_left, y: cfg.margin_top, placed: 0 }
    }

    /// Count the label just drawn and step to the next cell.
    /// Returns `true` when that label filled the page.
    /// `cfg` must pass [`GridConfig::check`].
    pub fn advance(&mut self, cfg: &GridConfig) -> bool {
        self.placed += 1;
        if self.placed % cfg.columns == 0 {
            self.x = cfg.margin_left;
            self.y += cfg.cell_h;
        } else {
            self.x += cfg.cell_w;
        }
        self.placed % cfg.labels_per_page() == 0
    }

    pub fn new_page(&mut self, cfg: &GridConfig) {
        self.x = cfg.margin_left;
        self.y = cfg.margin_top;
    }
}

/// Text fields and barcode bitmap for one printed copy of a record.
pub struct RenderedLabel<'a> {
    pub title: &'a str,
    pub record: &'a LabelRecord,
    /// Normalized code, printed under the bars.
    pub code: &'a str,
    pub barcode: &'a GrayImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSummary {
    pub labels: u32,
    pub pages: u32,
}

/// A blank title still prints an (empty) header line.
pub fn normalize_title(title: &str) -> &str {
    let t = title.trim();
    if t.is_empty() { " " } else { t }
}

/// Place every physical label of `records` on `canvas`, in record then quantity order.
///
/// Stops at the first row that fails validation or cannot be rasterized; the
/// canvas then holds a partial sheet that must not be saved.
pub fn layout<R, C>(
    records: &[LabelRecord],
    format: Symbology,
    title: &str,
    cfg: &GridConfig,
    rasterizer: &mut R,
    canvas: &mut C,
) -> Result<LayoutSummary, LayoutError>
where
    R: Rasterizer + ?Sized,
    C: LabelCanvas + ?Sized,
{
    cfg.check()?;
    if records.is_empty() {
        return Err(LayoutError::EmptyInput);
    }
    let title = normalize_title(title);
    let opts = RenderOptions::default();
    let mut cursor = Cursor::new(cfg);
    let mut pages = 1;

    for (idx, record) in records.iter().enumerate() {
        let row = idx + 1;
        if let Err(reason) = record.check(format) {
            log::warn!("row {row} refused: {reason}");
            return Err(LayoutError::InvalidRecord { row, reason });
        }
        let code = normalize(&record.code, format);

        // identical for every copy of the record
        let barcode = rasterizer.render(&code, format, &opts).map_err(|source| {
            log::warn!("row {row}: {format} rasterizer refused {code:?}: {source}");
            LayoutError::RenderError { row, code: code.clone(), format, source }
        })?;

        let label = RenderedLabel { title, record, code: &code, barcode: &barcode };
        for unit in 0..record.quantity {
            log::debug!(
                "row {row} copy {}/{} at ({:.2}, {:.2}) page {pages}",
                unit + 1,
                record.quantity,
                cursor.x,
                cursor.y
            );
            draw_label(canvas, cfg, cursor.x, cursor.y, &label);

            let page_full = cursor.advance(cfg);
            let last = row == records.len() && unit + 1 == record.quantity;
            if page_full && !last {
                log::debug!("page {pages} full after {} labels", cursor.placed);
                canvas.add_page();
                cursor.new_page(cfg);
                pages += 1;
            }
        }
    }

    log::info!("placed {} {format} labels on {pages} page(s)", cursor.placed);
    Ok(LayoutSummary { labels: cursor.placed, pages })
}

/// Draw one label cell with its top-left corner at (`x`, `y`).
pub fn draw_label<C: LabelCanvas + ?Sized>(canvas: &mut C, cfg: &GridConfig, x: f32, y: f32, label: &RenderedLabel<'_>) {
    let w = cfg.cell_w;

    canvas.set_stroke_gray(FRAME_GRAY);
    canvas.set_line_width(FRAME_LINE_W);
    canvas.rect(x, y, w, cfg.cell_h);

    canvas.set_font(FontWeight::Bold);
    canvas.set_font_size(TITLE_PT);
    canvas.text(label.title, x + w / 2.0, y + TITLE_Y, Align::Center);

    // branch (left) and purchase order (right) share the first line
    canvas.set_font_size(FIELD_PT);
    canvas.text(BRANCH_LABEL, x + FIELD_LABEL_X, y + FIRST_LINE_Y, Align::Left);
    canvas.set_font(FontWeight::Normal);
    canvas.text(&label.record.branch, x + FIELD_VALUE_X, y + FIRST_LINE_Y, Align::Left);

    canvas.set_font(FontWeight::Bold);
    canvas.text(PO_LABEL, x + w - PO_LABEL_FROM_RIGHT, y + FIRST_LINE_Y, Align::Left);
    canvas.set_font(FontWeight::Normal);
    canvas.text(&label.record.purchase_order, x + w - PO_VALUE_FROM_RIGHT, y + FIRST_LINE_Y, Align::Right);

    canvas.set_font(FontWeight::Bold);
    canvas.text(AREA_LABEL, x + FIELD_LABEL_X, y + SECOND_LINE_Y, Align::Left);
    canvas.set_font(FontWeight::Normal);
    canvas.text(&label.record.area, x + FIELD_VALUE_X, y + SECOND_LINE_Y, Align::Left);

    let img_w = w - 2.0 * BARCODE_SIDE_MARGIN;
    let img_x = x + (w - img_w) / 2.0;
    let bar_y = y + BARCODE_Y;
    canvas.image(label.barcode, img_x, bar_y, img_w, BARCODE_H);

    canvas.set_font(FontWeight::Normal);
    canvas.set_font_size(CAPTION_PT);
    canvas.text(label.code, x + w / 2.0, bar_y + CAPTION_BELOW_BARCODE, Align::Center);
}

/// One call made on a [`LabelCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    StrokeGray(u8),
    LineWidth(f32),
    Rect { x: f32, y: f32, w: f32, h: f32 },
    Font(FontWeight),
    FontSize(f32),
    Text { content: String, x: f32, y: f32, align: Align },
    Image { width_px: u32, height_px: u32, x: f32, y: f32, w: f32, h: f32 },
    AddPage,
}

/// Canvas that only records what would be drawn; used for dry runs.
#[derive(Debug, Default)]
pub struct CommandLog {
    pub commands: Vec<DrawCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> usize {
        1 + self.commands.iter().filter(|c| matches!(c, DrawCommand::AddPage)).count()
    }

    /// Frame origins in drawing order, one per placed label.
    pub fn frames(&self) -> Vec<(f32, f32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl LabelCanvas for CommandLog {
    fn set_stroke_gray(&mut self, level: u8) {
        self.commands.push(DrawCommand::StrokeGray(level));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Rect { x, y, w, h });
    }

    fn set_font(&mut self, weight: FontWeight) {
        self.commands.push(DrawCommand::Font(weight));
    }

    fn set_font_size(&mut self, size_pt: f32) {
        self.commands.push(DrawCommand::FontSize(size_pt));
    }

    fn text(&mut self, content: &str, x: f32, y: f32, align: Align) {
        self.commands.push(DrawCommand::Text { content: content.to_string(), x, y, align });
    }

    fn image(&mut self, img: &GrayImage, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Image { width_px: img.width(), height_px: img.height(), x, y, w, h });
    }

    fn add_page(&mut self) {
        self.commands.push(DrawCommand::AddPage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    fn fake_bars(_: &str, _: Symbology, opts: &RenderOptions) -> Result<GrayImage, EncodeError> {
        Ok(GrayImage::new(10 * opts.module_width, opts.bar_height))
    }

    fn records(quantities: &[u32]) -> Vec<LabelRecord> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| LabelRecord::new("Centro", "Bodega", &format!("OC-{i}"), &format!("CODE{i}"), q))
            .collect()
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn cursor_walks_the_grid() {
        let cfg = GridConfig::default();
        let mut cursor = Cursor::new(&cfg);
        for k in 1..=10 {
            assert!(close((cursor.x, cursor.y), cfg.cell_origin(k)), "label {k}");
            let full = cursor.advance(&cfg);
            assert_eq!(full, k == 10);
        }
        // a full page leaves the cursor below the grid until a page break
        assert!(close((cursor.x, cursor.y), (cfg.margin_left, cfg.margin_top + 5.0 * cfg.cell_h)));
        cursor.new_page(&cfg);
        assert!(close((cursor.x, cursor.y), cfg.cell_origin(11)));
    }

    #[test]
    fn cell_origin_formula() {
        let cfg = GridConfig { columns: 3, rows_per_page: 2, ..GridConfig::default() };
        assert!(close(cfg.cell_origin(1), (1.5, 0.5)));
        assert!(close(cfg.cell_origin(3), (1.5 + 2.0 * 9.0, 0.5)));
        assert!(close(cfg.cell_origin(4), (1.5, 0.5 + 5.65)));
        assert!(close(cfg.cell_origin(7), (1.5, 0.5)));
        assert!(close(cfg.cell_origin(0), cfg.cell_origin(1)));
    }

    #[test]
    fn draw_order_of_one_cell() {
        let mut log = CommandLog::new();
        let rec = LabelRecord::new("Centro", "Bodega", "OC-9", "ABC", 1);
        let img = GrayImage::new(20, 60);
        let label = RenderedLabel { title: "ACME", record: &rec, code: "ABC", barcode: &img };
        draw_label(&mut log, &GridConfig::default(), 1.5, 0.5, &label);

        let texts: Vec<(&str, Align)> = log
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, align, .. } => Some((content.as_str(), *align)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("ACME", Align::Center),
                (BRANCH_LABEL, Align::Left),
                ("Centro", Align::Left),
                (PO_LABEL, Align::Left),
                ("OC-9", Align::Right),
                (AREA_LABEL, Align::Left),
                ("Bodega", Align::Left),
                ("ABC", Align::Center),
            ]
        );
        assert_eq!(log.commands[0], DrawCommand::StrokeGray(FRAME_GRAY));
        assert_eq!(log.commands[2], DrawCommand::Rect { x: 1.5, y: 0.5, w: LABEL_W, h: LABEL_H });

        let image = log.commands.iter().find_map(|c| match c {
            DrawCommand::Image { x, y, w, h, .. } => Some((*x, *y, *w, *h)),
            _ => None,
        });
        let (x, y, w, h) = image.unwrap();
        assert!((x - 2.2).abs() < 1e-4 && (y - 3.3).abs() < 1e-4);
        assert!((w - 7.6).abs() < 1e-4 && (h - BARCODE_H).abs() < 1e-4);
    }

    #[test]
    fn no_trailing_page_on_exact_fill() {
        let mut log = CommandLog::new();
        let mut raster = fake_bars;
        let summary =
            layout(&records(&[10]), Symbology::Code128, "T", &GridConfig::default(), &mut raster, &mut log).unwrap();
        assert_eq!(summary, LayoutSummary { labels: 10, pages: 1 });
        assert_eq!(log.pages(), 1);
    }

    #[test]
    fn eleventh_label_opens_page_two() {
        let mut log = CommandLog::new();
        let mut raster = fake_bars;
        let cfg = GridConfig::default();
        let summary = layout(&records(&[4, 7]), Symbology::Code128, "T", &cfg, &mut raster, &mut log).unwrap();
        assert_eq!(summary, LayoutSummary { labels: 11, pages: 2 });

        let break_at = log.commands.iter().position(|c| *c == DrawCommand::AddPage).unwrap();
        let frames_before = log.commands[..break_at].iter().filter(|c| matches!(c, DrawCommand::Rect { .. })).count();
        assert_eq!(frames_before, 10);
        assert!(close(*log.frames().last().unwrap(), (cfg.margin_left, cfg.margin_top)));
    }

    #[test]
    fn empty_input() {
        let mut log = CommandLog::new();
        let mut raster = fake_bars;
        let err = layout(&[], Symbology::Ean13, "T", &GridConfig::default(), &mut raster, &mut log).unwrap_err();
        assert!(matches!(err, LayoutError::EmptyInput));
        assert!(log.commands.is_empty());
    }

    #[test]
    fn zero_sized_grid_is_refused() {
        let records = [LabelRecord::new("A", "B", "C", "X", 3)];
        for (columns, rows_per_page) in [(0, 5), (2, 0), (0, 0)] {
            let cfg = GridConfig { columns, rows_per_page, ..GridConfig::default() };
            let mut log = CommandLog::new();
            let mut raster = fake_bars;
            let err = layout(&records, Symbology::Code128, "T", &cfg, &mut raster, &mut log).unwrap_err();
            assert!(matches!(err, LayoutError::EmptyGrid { .. }), "{columns} x {rows_per_page}");
            assert!(log.commands.is_empty());
        }
    }

    #[test]
    fn blank_title_becomes_a_space() {
        assert_eq!(normalize_title("   "), " ");
        assert_eq!(normalize_title(" ACME "), "ACME");
    }
}
