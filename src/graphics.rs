use image::{GrayImage, ImageBuffer, Luma};

use crate::barcode::{gs1_check_digit, Symbology};
use crate::consts::{HEIGHT, ITF_WIDE, NARROW, QUIET};
use crate::error::EncodeError;

/// Bitmap settings handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Ask for the human readable digits under the bars. [`BarcodeRasterizer`]
    /// never prints them, the layout draws the code as a caption instead.
    pub display_value: bool,
    /// Width of the narrowest bar, in pixels.
    pub module_width: u32,
    pub bar_height: u32,
    /// White border on every side, in pixels.
    pub margin: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            display_value: false,
            module_width: NARROW,
            bar_height: HEIGHT,
            margin: QUIET,
        }
    }
}

/// Turns code text into a barcode bitmap.
pub trait Rasterizer {
    fn render(&mut self, data: &str, format: Symbology, opts: &RenderOptions) -> Result<GrayImage, EncodeError>;
}

impl<F> Rasterizer for F
where
    F: FnMut(&str, Symbology, &RenderOptions) -> Result<GrayImage, EncodeError>,
{
    fn render(&mut self, data: &str, format: Symbology, opts: &RenderOptions) -> Result<GrayImage, EncodeError> {
        self(data, format, opts)
    }
}

/// Built-in rasterizer for every [`Symbology`]. Paints bars only and
/// ignores [`RenderOptions::display_value`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BarcodeRasterizer;

impl Rasterizer for BarcodeRasterizer {
    fn render(&mut self, data: &str, format: Symbology, opts: &RenderOptions) -> Result<GrayImage, EncodeError> {
        render_barcode(data, format, opts)
    }
}

/// Encode `data` and paint it as black bars on white.
pub fn render_barcode(data: &str, format: Symbology, opts: &RenderOptions) -> Result<GrayImage, EncodeError> {
    let modules = encode(data, format)?;
    Ok(paint(&modules, opts))
}

/// Encode into a module sequence, `true` = bar.
pub fn encode(data: &str, format: Symbology) -> Result<Vec<bool>, EncodeError> {
    match format {
        Symbology::Ean13 => Ok(ean13_modules(&complete_gs1(data, format)?)),
        Symbology::Upc => {
            // UPC-A is EAN-13 with an implied leading zero
            let mut digits = vec![0];
            digits.extend(complete_gs1(data, format)?);
            Ok(ean13_modules(&digits))
        }
        Symbology::Ean8 => Ok(ean8_modules(&complete_gs1(data, format)?)),
        Symbology::Itf14 => Ok(itf_modules(&complete_gs1(data, format)?)),
        Symbology::Code128 => code128_modules(data),
    }
}

fn paint(modules: &[bool], opts: &RenderOptions) -> GrayImage {
    let m = opts.module_width.max(1);
    let w = (modules.len() as u32 * m + opts.margin * 2).max(1);
    let h = (opts.bar_height + opts.margin * 2).max(1);
    let mut img: GrayImage = ImageBuffer::from_pixel(w, h, Luma([255u8]));

    for (i, _) in modules.iter().enumerate().filter(|(_, bar)| **bar) {
        let x0 = opts.margin + i as u32 * m;
        for x in x0..x0 + m {
            for y in opts.margin..opts.margin + opts.bar_height {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
    img
}

// ======== GS1 numeric formats ========

/// Accept the full symbol with a correct check digit, or one digit short and append it.
fn complete_gs1(data: &str, format: Symbology) -> Result<Vec<u8>, EncodeError> {
    if let Some(ch) = data.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }
    let full_len = format.symbol_digits().ok_or(EncodeError::InvalidLength { format, len: data.len() })?;
    let (body, given) = match data.len() {
        n if n == full_len => (&data[..n - 1], Some(data.as_bytes()[n - 1] - b'0')),
        n if n + 1 == full_len => (data, None),
        len => return Err(EncodeError::InvalidLength { format, len }),
    };
    let expected = gs1_check_digit(body).ok_or(EncodeError::InvalidLength { format, len: data.len() })?;
    if let Some(found) = given {
        if found != expected {
            return Err(EncodeError::BadCheckDigit { format, expected, found });
        }
    }
    let mut digits: Vec<u8> = body.bytes().map(|b| b - b'0').collect();
    digits.push(expected);
    Ok(digits)
}

const EAN_L: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011",
    "0110001", "0101111", "0111011", "0110111", "0001011",
];
const EAN_G: [&str; 10] = [
    "0100111", "0110011", "0011011", "0100001", "0011101",
    "0111001", "0000101", "0010001", "0001001", "0010111",
];
const EAN_R: [&str; 10] = [
    "1110010", "1100110", "1101100", "1000010", "1011100",
    "1001110", "1010000", "1000100", "1001000", "1110100",
];
// L/G choice for the left half, keyed by the first digit
const EAN13_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG",
    "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL", "LGGLGL",
];

fn push_bits(out: &mut Vec<bool>, bits: &str) {
    out.extend(bits.bytes().map(|b| b == b'1'));
}

fn ean13_modules(digits: &[u8]) -> Vec<bool> {
    let parity = EAN13_PARITY[digits[0] as usize].as_bytes();
    let mut out = Vec::with_capacity(95);
    push_bits(&mut out, "101");
    for (i, &d) in digits[1..7].iter().enumerate() {
        let table = if parity[i] == b'G' { &EAN_G } else { &EAN_L };
        push_bits(&mut out, table[d as usize]);
    }
    push_bits(&mut out, "01010");
    for &d in &digits[7..13] {
        push_bits(&mut out, EAN_R[d as usize]);
    }
    push_bits(&mut out, "101");
    out
}

fn ean8_modules(digits: &[u8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(67);
    push_bits(&mut out, "101");
    for &d in &digits[..4] {
        push_bits(&mut out, EAN_L[d as usize]);
    }
    push_bits(&mut out, "01010");
    for &d in &digits[4..8] {
        push_bits(&mut out, EAN_R[d as usize]);
    }
    push_bits(&mut out, "101");
    out
}

// ======== Interleaved 2 of 5 ========

// N = narrow, W = wide
const ITF_WIDTHS: [&str; 10] = [
    "NNWWN", "WNNNW", "NWNNW", "WWNNN", "NNWNW",
    "WNWNN", "NWWNN", "NNNWW", "WNNWN", "NWNWN",
];

fn itf_modules(digits: &[u8]) -> Vec<bool> {
    let width = |c: u8| if c == b'W' { ITF_WIDE as usize } else { 1 };
    let mut out = Vec::new();
    push_bits(&mut out, "1010");
    for pair in digits.chunks(2) {
        let bars = ITF_WIDTHS[pair[0] as usize].as_bytes();
        let spaces = ITF_WIDTHS[pair[1] as usize].as_bytes();
        for (&b, &s) in bars.iter().zip(spaces) {
            out.extend(std::iter::repeat(true).take(width(b)));
            out.extend(std::iter::repeat(false).take(width(s)));
        }
    }
    out.extend(std::iter::repeat(true).take(ITF_WIDE as usize));
    push_bits(&mut out, "01");
    out
}

// ======== Code 128 (subset B) ========

// Bar/space widths per symbol value; bars first.
const CODE128_WIDTHS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212", "221213",
    "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221", "223211", "221132",
    "221231", "213212", "223112", "312131", "311222", "321122", "321221", "312212", "322112", "322211",
    "212123", "212321", "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121", "313121", "211331",
    "231131", "213113", "213311", "213131", "311123", "311321", "331121", "312113", "312311", "332111",
    "314111", "221411", "431111", "111224", "111422", "121124", "121421", "141122", "141221", "112214",
    "112412", "122114", "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311", "113141",
    "114131", "311141", "411131", "211412", "211214", "211232",
];
const CODE128_STOP: &str = "2331112";
const CODE128_START_B: usize = 104;

fn push_widths(out: &mut Vec<bool>, widths: &str) {
    for (i, w) in widths.bytes().enumerate() {
        out.extend(std::iter::repeat(i % 2 == 0).take((w - b'0') as usize));
    }
}

fn code128_modules(data: &str) -> Result<Vec<bool>, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::InvalidLength { format: Symbology::Code128, len: 0 });
    }
    let values = data
        .chars()
        .map(|ch| match ch {
            ' '..='\u{7f}' => Ok(ch as usize - 32),
            _ => Err(EncodeError::InvalidCharacter { format: Symbology::Code128, ch }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let check = values
        .iter()
        .enumerate()
        .fold(CODE128_START_B, |acc, (i, v)| acc + (i + 1) * v)
        % 103;

    let mut out = Vec::with_capacity((values.len() + 3) * 11 + 2);
    push_widths(&mut out, CODE128_WIDTHS[CODE128_START_B]);
    for &v in &values {
        push_widths(&mut out, CODE128_WIDTHS[v]);
    }
    push_widths(&mut out, CODE128_WIDTHS[check]);
    push_widths(&mut out, CODE128_STOP);
    Ok(out)
}
