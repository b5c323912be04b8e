use serde::{Deserialize, Deserializer, Serialize};

use crate::barcode::{validate, Symbology};
use crate::error::RecordFault;

/// One table row as typed by the user, every cell still text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub branch: String,
    pub area: String,
    #[serde(alias = "oc", alias = "po")]
    pub purchase_order: String,
    pub code: String,
    #[serde(deserialize_with = "quantity_text")]
    pub quantity: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityText {
    Text(String),
    Number(i64),
}

// rows files may carry the quantity as a JSON number or as typed text
fn quantity_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match QuantityText::deserialize(d)? {
        QuantityText::Text(s) => s,
        QuantityText::Number(n) => n.to_string(),
    })
}

/// A row with trimmed fields and a numeric quantity.
///
/// The quantity is the leading integer of the typed text, so "3 uds" is 3
/// and "2.5" is 2. Text without leading digits, a non-positive value or one
/// past `u32::MAX` is kept as 0 so the row is refused when the layout
/// reaches it, not before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub branch: String,
    pub area: String,
    pub purchase_order: String,
    pub code: String,
    pub quantity: u32,
}

impl LabelRecord {
    pub fn new(branch: &str, area: &str, purchase_order: &str, code: &str, quantity: u32) -> Self {
        Self {
            branch: branch.trim().to_string(),
            area: area.trim().to_string(),
            purchase_order: purchase_order.trim().to_string(),
            code: code.trim().to_string(),
            quantity,
        }
    }

    /// All fields filled, quantity positive and the code acceptable for `format`.
    pub fn check(&self, format: Symbology) -> Result<(), RecordFault> {
        let fields = [
            ("branch", &self.branch),
            ("area", &self.area),
            ("purchase_order", &self.purchase_order),
            ("code", &self.code),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RecordFault::MissingField(*name));
        }
        if self.quantity == 0 {
            return Err(RecordFault::InvalidQuantity);
        }
        validate(&self.code, Some(format))?;
        Ok(())
    }
}

impl From<&RawRow> for LabelRecord {
    fn from(row: &RawRow) -> Self {
        Self::new(&row.branch, &row.area, &row.purchase_order, &row.code, leading_quantity(&row.quantity))
    }
}

/// Optional sign and the digits that follow it; anything after is ignored.
fn leading_quantity(text: &str) -> u32 {
    let text = text.trim();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
    match rest[..end].parse::<u32>() {
        Ok(n) if !negative => n,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn raw(quantity: &str) -> RawRow {
        RawRow {
            branch: " Centro ".into(),
            area: "Bodega".into(),
            purchase_order: "OC-77".into(),
            code: " 400638133393".into(),
            quantity: quantity.into(),
        }
    }

    #[test]
    fn fields_are_trimmed() {
        let rec = LabelRecord::from(&raw(" 3 "));
        assert_eq!(rec.branch, "Centro");
        assert_eq!(rec.code, "400638133393");
        assert_eq!(rec.quantity, 3);
        assert_eq!(rec.check(Symbology::Ean13), Ok(()));
    }

    #[test]
    fn quantity_is_the_leading_integer() {
        for (q, n) in [("2.5", 2), ("3 uds", 3), ("1e3", 1), ("+2", 2), (" 07", 7)] {
            let rec = LabelRecord::from(&raw(q));
            assert_eq!(rec.quantity, n, "{q:?}");
            assert_eq!(rec.check(Symbology::Ean13), Ok(()));
        }
    }

    #[test]
    fn bad_quantities_become_zero() {
        for q in ["", "0", "-2", "abc", "+", "- 3", "4294967296"] {
            let rec = LabelRecord::from(&raw(q));
            assert_eq!(rec.quantity, 0, "{q:?}");
            assert_eq!(rec.check(Symbology::Ean13), Err(RecordFault::InvalidQuantity));
        }
    }

    #[test]
    fn first_empty_field_is_reported() {
        let rec = LabelRecord::new("Centro", "  ", "", "123", 1);
        assert_eq!(rec.check(Symbology::Code128), Err(RecordFault::MissingField("area")));
    }

    #[test]
    fn code_is_checked_after_fields() {
        let rec = LabelRecord::new("Centro", "Bodega", "OC-1", "12345", 2);
        assert_eq!(
            rec.check(Symbology::Ean13),
            Err(RecordFault::Code(ValidationError::BadLength { format: Symbology::Ean13, len: 5 }))
        );
    }

    #[test]
    fn quantity_accepts_number_or_text() {
        let rows: Vec<RawRow> = serde_json::from_str(
            r#"[
                {"branch": "A", "area": "B", "purchase_order": "C", "code": "D", "quantity": 4},
                {"branch": "A", "area": "B", "oc": "C", "code": "D", "quantity": "5"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].quantity, "4");
        assert_eq!(rows[1].purchase_order, "C");
        assert_eq!(LabelRecord::from(&rows[1]).quantity, 5);
    }
}
