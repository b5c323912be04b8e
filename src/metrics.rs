//! Text advance widths, needed to centre and right-align strings on a label.

use rusttype::{point, Font, Scale};

use crate::builder::FontWeight;
use crate::error::LayoutError;

/// Width of a string set in a given face, in points.
pub trait TextMetrics {
    fn text_width(&self, text: &str, weight: FontWeight, size_pt: f32) -> f32;
}

// AFM advance widths (1/1000 em) for ' '..='~'
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Metrics of the PDF base-14 Helvetica faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct Helvetica;

impl Helvetica {
    fn glyph_width(ch: char, weight: FontWeight) -> u16 {
        let table = match weight {
            FontWeight::Normal => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        // accented letters share the advance of their base letter
        let base = match ch {
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ñ' => 'N',
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            c => c,
        };
        match base {
            ' '..='~' => table[base as usize - 32],
            _ => 556,
        }
    }
}

impl TextMetrics for Helvetica {
    fn text_width(&self, text: &str, weight: FontWeight, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| Self::glyph_width(c, weight) as u32).sum();
        units as f32 * size_pt / 1000.0
    }
}

/// Metrics of user supplied TrueType faces.
pub struct TtfMetrics {
    regular: Font<'static>,
    bold: Font<'static>,
}

impl TtfMetrics {
    pub fn new(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self, LayoutError> {
        let regular = Font::try_from_vec(regular).ok_or_else(|| LayoutError::Font("regular face is not a TrueType font".into()))?;
        let bold = Font::try_from_vec(bold).ok_or_else(|| LayoutError::Font("bold face is not a TrueType font".into()))?;
        Ok(Self { regular, bold })
    }
}

impl TextMetrics for TtfMetrics {
    fn text_width(&self, text: &str, weight: FontWeight, size_pt: f32) -> f32 {
        let font = match weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        };
        // rusttype scales by ascent-to-descent height, PDF by em
        let vm = font.v_metrics_unscaled();
        let upem = font.units_per_em().max(1) as f32;
        let scale = Scale::uniform(size_pt * (vm.ascent - vm.descent) / upem);

        font.layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_digits() {
        let w = Helvetica.text_width("4006381333931", FontWeight::Normal, 10.0);
        assert!((w - 13.0 * 5.56).abs() < 1e-3);
    }

    #[test]
    fn helvetica_bold_label_with_accent() {
        let w = Helvetica.text_width("ÁREA:", FontWeight::Bold, 10.0);
        assert!((w - 31.66).abs() < 1e-3, "{w}");
    }

    #[test]
    fn bold_is_not_narrower() {
        let text = "Sucursal Centro 123";
        assert!(
            Helvetica.text_width(text, FontWeight::Bold, 12.0) >= Helvetica.text_width(text, FontWeight::Normal, 12.0)
        );
    }

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(Helvetica.text_width("", FontWeight::Bold, 13.0), 0.0);
    }

    #[test]
    fn garbage_font_bytes_are_refused() {
        assert!(matches!(TtfMetrics::new(vec![0; 16], vec![0; 16]), Err(LayoutError::Font(_))));
    }
}
