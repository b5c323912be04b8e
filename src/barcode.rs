use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Barcode formats a sheet can be printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Ean13,
    Ean8,
    /// EAN-14 shipping container code printed as interleaved 2 of 5.
    Itf14,
    /// UPC-A
    Upc,
    Code128,
}

impl Symbology {
    pub const ALL: [Symbology; 5] = [
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Itf14,
        Symbology::Upc,
        Symbology::Code128,
    ];

    /// Identifier used on the command line and in the output file name.
    pub fn id(self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN13",
            Symbology::Ean8 => "EAN8",
            Symbology::Itf14 => "ITF14",
            Symbology::Upc => "UPC",
            Symbology::Code128 => "CODE128",
        }
    }

    /// Digit counts accepted on input, or `None` for free-form formats.
    pub fn allowed_lengths(self) -> Option<&'static [usize]> {
        match self {
            Symbology::Ean13 => Some(&[12, 13]),
            Symbology::Ean8 => Some(&[7, 8]),
            Symbology::Itf14 => Some(&[14]),
            Symbology::Upc => Some(&[12]),
            Symbology::Code128 => None,
        }
    }

    /// Digits in the printed symbol, GS1 mod-10 check digit included.
    /// `None` for formats that carry no check digit.
    pub fn symbol_digits(self) -> Option<usize> {
        match self {
            Symbology::Ean13 => Some(13),
            Symbology::Ean8 => Some(8),
            Symbology::Itf14 => Some(14),
            Symbology::Upc => Some(12),
            Symbology::Code128 => None,
        }
    }

    pub fn length_hint(self) -> &'static str {
        match self {
            Symbology::Ean13 => "12 or 13",
            Symbology::Ean8 => "7 or 8",
            Symbology::Itf14 => "14",
            Symbology::Upc => "12",
            Symbology::Code128 => "any number of",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Symbology {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::MissingFormat);
        }
        let wanted = s.replace(['-', '_', ' '], "").to_ascii_uppercase();
        let wanted = match wanted.as_str() {
            "UPCA" => "UPC",
            "EAN14" => "ITF14",
            other => other,
        };
        Symbology::ALL
            .into_iter()
            .find(|f| f.id() == wanted)
            .ok_or_else(|| ValidationError::UnknownFormat(s.to_string()))
    }
}

/// Parse an optional format selection; nothing selected is `MissingFormat`.
pub fn parse_format(id: Option<&str>) -> Result<Symbology, ValidationError> {
    id.ok_or(ValidationError::MissingFormat)?.parse()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check a code against the structural rules of `format`.
pub fn validate(code: &str, format: Option<Symbology>) -> Result<(), ValidationError> {
    let format = format.ok_or(ValidationError::MissingFormat)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::EmptyCode);
    }

    let numeric = all_digits(code);
    if numeric && code.len() == 14 && format != Symbology::Itf14 {
        return Err(ValidationError::WrongSymbologyForLength);
    }

    if let Some(lengths) = format.allowed_lengths() {
        if !numeric {
            return Err(ValidationError::NonNumeric(format));
        }
        if !lengths.contains(&code.len()) {
            return Err(ValidationError::BadLength { format, len: code.len() });
        }
    }
    Ok(())
}

/// EAN-13 check digit of a 12 digit code. `None` unless the input is exactly 12 ASCII digits.
pub fn checksum(code12: &str) -> Option<u8> {
    if code12.len() != 12 || !all_digits(code12) {
        return None;
    }
    let sum: u32 = code12
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d } else { d * 3 }
        })
        .sum();
    Some(((10 - sum % 10) % 10) as u8)
}

/// GS1 mod-10 check digit: weights alternate 3,1,3... starting from the rightmost digit.
pub fn gs1_check_digit(digits: &str) -> Option<u8> {
    if !all_digits(digits) {
        return None;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    Some(((10 - sum % 10) % 10) as u8)
}

/// Trim the code and complete a 12 digit EAN-13 with its check digit.
pub fn normalize(code: &str, format: Symbology) -> String {
    let code = code.trim();
    match (format, checksum(code)) {
        (Symbology::Ean13, Some(check)) => format!("{code}{check}"),
        _ => code.to_string(),
    }
}
