use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use image::{DynamicImage, GrayImage};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Px, Rgb,
};

use crate::barcode::Symbology;
use crate::builder::{Align, FontWeight, LabelCanvas};
use crate::consts::{PAGE_H, PAGE_W};
use crate::error::LayoutError;
use crate::metrics::{Helvetica, TextMetrics, TtfMetrics};

const DPI: f32 = 300.0;
const LAYER: &str = "Labels";

fn cm(v: f32) -> Mm {
    Mm(v * 10.0)
}

/// `etiquetas_<FORMAT>.pdf`
pub fn output_file_name(format: Symbology) -> String {
    format!("etiquetas_{}.pdf", format.id())
}

/// A4 document the sheet is drawn into. Nothing touches the disk until [`PdfCanvas::save`].
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    metrics: Box<dyn TextMetrics>,
    weight: FontWeight,
    size_pt: f32,
}

impl PdfCanvas {
    /// Document set in the built-in Helvetica faces.
    pub fn new(title: &str) -> Result<Self, LayoutError> {
        let (doc, layer) = Self::document(title);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| LayoutError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| LayoutError::Pdf(e.to_string()))?;
        Ok(Self::with_parts(doc, layer, regular, bold, Box::new(Helvetica)))
    }

    /// Document with embedded TrueType faces, for text outside the WinAnsi range.
    pub fn with_fonts(title: &str, regular: Vec<u8>, bold: Vec<u8>) -> Result<Self, LayoutError> {
        let metrics = TtfMetrics::new(regular.clone(), bold.clone())?;
        let (doc, layer) = Self::document(title);
        let regular = doc
            .add_external_font(Cursor::new(regular))
            .map_err(|e| LayoutError::Font(e.to_string()))?;
        let bold = doc
            .add_external_font(Cursor::new(bold))
            .map_err(|e| LayoutError::Font(e.to_string()))?;
        Ok(Self::with_parts(doc, layer, regular, bold, Box::new(metrics)))
    }

    fn document(title: &str) -> (PdfDocumentReference, PdfLayerReference) {
        let (doc, page, layer) = PdfDocument::new(title, cm(PAGE_W), cm(PAGE_H), LAYER);
        let layer = doc.get_page(page).get_layer(layer);
        (doc, layer)
    }

    fn with_parts(
        doc: PdfDocumentReference,
        layer: PdfLayerReference,
        regular: IndirectFontRef,
        bold: IndirectFontRef,
        metrics: Box<dyn TextMetrics>,
    ) -> Self {
        Self { doc, layer, regular, bold, metrics, weight: FontWeight::Normal, size_pt: 16.0 }
    }

    fn font(&self) -> &IndirectFontRef {
        match self.weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// PDF y axis grows upwards from the bottom edge.
    fn flip(y: f32) -> f32 {
        PAGE_H - y
    }

    pub fn to_bytes(self) -> Result<Vec<u8>, LayoutError> {
        self.doc.save_to_bytes().map_err(|e| LayoutError::Pdf(e.to_string()))
    }

    pub fn save(self, path: &Path) -> Result<(), LayoutError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.doc.save(&mut writer).map_err(|e| LayoutError::Pdf(e.to_string()))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

impl LabelCanvas for PdfCanvas {
    fn set_stroke_gray(&mut self, level: u8) {
        let g = level as f32 / 255.0;
        self.layer.set_outline_color(Color::Rgb(Rgb::new(g, g, g, None)));
    }

    fn set_line_width(&mut self, width: f32) {
        // cm to pt
        self.layer.set_outline_thickness(width / 2.54 * 72.0);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
        let points = corners
            .iter()
            .map(|&(px, py)| (Point::new(cm(px), cm(Self::flip(py))), false))
            .collect();
        self.layer.add_line(Line { points, is_closed: true });
    }

    fn set_font(&mut self, weight: FontWeight) {
        self.weight = weight;
    }

    fn set_font_size(&mut self, size_pt: f32) {
        self.size_pt = size_pt;
    }

    fn text(&mut self, content: &str, x: f32, y: f32, align: Align) {
        let width_cm = self.metrics.text_width(content, self.weight, self.size_pt) / 72.0 * 2.54;
        let x = match align {
            Align::Left => x,
            Align::Center => x - width_cm / 2.0,
            Align::Right => x - width_cm,
        };
        self.layer.use_text(content, self.size_pt, cm(x), cm(Self::flip(y)), self.font());
    }

    fn image(&mut self, img: &GrayImage, x: f32, y: f32, w: f32, h: f32) {
        let rgb = DynamicImage::ImageLuma8(img.clone()).to_rgb8();
        let (width_px, height_px) = rgb.dimensions();
        if width_px == 0 || height_px == 0 {
            return;
        }
        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // natural size at DPI, stretched to the requested box
        let natural_w = width_px as f32 / DPI * 2.54;
        let natural_h = height_px as f32 / DPI * 2.54;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(cm(x)),
                translate_y: Some(cm(Self::flip(y + h))),
                scale_x: Some(w / natural_w),
                scale_y: Some(h / natural_h),
                dpi: Some(DPI),
                ..Default::default()
            },
        );
    }

    fn add_page(&mut self) {
        let (page, layer) = self.doc.add_page(cm(PAGE_W), cm(PAGE_H), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_carries_the_format() {
        assert_eq!(output_file_name(Symbology::Ean13), "etiquetas_EAN13.pdf");
        assert_eq!(output_file_name(Symbology::Itf14), "etiquetas_ITF14.pdf");
    }

    #[test]
    fn empty_document_serializes() {
        let canvas = PdfCanvas::new("test").unwrap();
        let bytes = canvas.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unreadable_font_files_are_refused() {
        let canvas = PdfCanvas::with_fonts("test", vec![0; 16], b"not a font".to_vec());
        assert!(matches!(canvas, Err(LayoutError::Font(_))));
    }
}
