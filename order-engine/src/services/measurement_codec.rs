//! Text form of measurement sheets.
//!
//! Grammar, one entry per line:
//!
//! ```text
//! === SHIRT ===
//! Length: 30
//! Chest: 40
//! ```
//!
//! Header titles are not checked against the garment catalog; unknown
//! sections pass through unchanged.
//!
//! `decode(encode(fields)) == fields` holds except for labels containing a
//! colon, text containing a newline, and header labels that are empty or
//! carry surrounding whitespace or a trailing colon.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::EngineError;
use crate::models::{MeasurementCatalog, MeasurementField, MeasurementSection, StandardOutfit};

const HEADER_DELIMITER: &str = "===";

/// `=== TITLE ===`, with an optional colon after the title or the line.
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^={3,}\s*(.*?)\s*:?\s*={3,}\s*:?$").expect("Invalid header pattern")
});

/// A line of `=` only.
static DIVIDER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^=+\s*:?$").expect("Invalid divider pattern"));

enum Line<'a> {
    Blank,
    /// A run of `=` with no title between the delimiters.
    Divider,
    Header(&'a str),
    Field(String, String),
}

/// Inner text when `text` is wrapped in one pair of matching quotes.
fn strip_quote_pair(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && matches!(first, '"' | '\'') => {
            Some(chars.as_str())
        }
        _ => None,
    }
}

fn unquote(text: &str) -> String {
    let text = text.trim();
    strip_quote_pair(text).unwrap_or(text).to_string()
}

/// Wrap text in quotes when decoding would otherwise change it. Labels
/// starting with `=` are wrapped so they never read back as a header.
fn quote_if_needed(text: &str, is_label: bool) -> String {
    if strip_quote_pair(text).is_some()
        || text != text.trim()
        || (is_label && text.starts_with('='))
    {
        format!("\"{text}\"")
    } else {
        text.to_string()
    }
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if DIVIDER_LINE.is_match(line) {
        return Line::Divider;
    }
    if let Some(captures) = HEADER_LINE.captures(line) {
        let title = captures.get(1).map_or("", |m| m.as_str());
        return if title.is_empty() {
            Line::Divider
        } else {
            Line::Header(title)
        };
    }

    match line.split_once(':') {
        Some((label, value)) => Line::Field(unquote(label), unquote(value)),
        None => Line::Field(unquote(line), String::new()),
    }
}

fn push_block(
    fields: &mut Vec<MeasurementField>,
    catalog: &MeasurementCatalog,
    garment_type: &str,
) -> Result<(), EngineError> {
    let definition = catalog
        .garment(garment_type)
        .ok_or_else(|| EngineError::UnknownGarmentType(garment_type.to_string()))?;

    fields.push(MeasurementField::header(definition.garment_type.clone()));
    fields.extend(
        definition
            .fields
            .iter()
            .map(|label| MeasurementField::field(label.clone(), String::new())),
    );
    Ok(())
}

/// Measurement codec.
#[derive(Debug, Clone)]
pub struct MeasurementCodec;

impl MeasurementCodec {
    pub fn decode(text: &str) -> Vec<MeasurementField> {
        let fields: Vec<MeasurementField> = text
            .lines()
            .filter_map(|line| match classify(line) {
                Line::Blank | Line::Divider => None,
                Line::Header(title) => Some(MeasurementField::header(title)),
                Line::Field(label, value) => Some(MeasurementField::Value { label, value }),
            })
            .collect();

        tracing::debug!(fields = fields.len(), "Decoded measurement text");
        fields
    }

    pub fn encode(fields: &[MeasurementField]) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(fields.len() * 2);

        for field in fields {
            match field {
                MeasurementField::Header { label } => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(format!("{HEADER_DELIMITER} {label} {HEADER_DELIMITER}"));
                }
                MeasurementField::Value { label, value } if value.is_empty() => {
                    lines.push(format!("{}:", quote_if_needed(label, true)));
                }
                MeasurementField::Value { label, value } => {
                    lines.push(format!(
                        "{}: {}",
                        quote_if_needed(label, true),
                        quote_if_needed(value, false)
                    ));
                }
            }
        }

        lines.join("\n")
    }

    /// Group a section document by header.
    pub fn sections(fields: &[MeasurementField]) -> Vec<MeasurementSection> {
        let mut sections: Vec<MeasurementSection> = Vec::new();

        for field in fields {
            match field {
                MeasurementField::Header { label } => sections.push(MeasurementSection {
                    title: Some(label.clone()),
                    fields: Vec::new(),
                }),
                MeasurementField::Value { .. } => match sections.last_mut() {
                    Some(section) => section.fields.push(field.clone()),
                    None => sections.push(MeasurementSection {
                        title: None,
                        fields: vec![field.clone()],
                    }),
                },
            }
        }

        sections
    }

    /// One header and blank field list per garment, in outfit order.
    pub fn expand_standard_outfit(
        catalog: &MeasurementCatalog,
        outfit: &StandardOutfit,
    ) -> Result<Vec<MeasurementField>, EngineError> {
        let mut fields = Vec::new();
        for garment_type in &outfit.garment_types {
            push_block(&mut fields, catalog, garment_type)?;
        }
        Ok(fields)
    }

    pub fn expand_named_outfit(
        catalog: &MeasurementCatalog,
        outfit_name: &str,
    ) -> Result<Vec<MeasurementField>, EngineError> {
        let outfit = catalog
            .outfit(outfit_name)
            .ok_or_else(|| EngineError::UnknownOutfit(outfit_name.to_string()))?;
        Self::expand_standard_outfit(catalog, outfit)
    }

    /// Existing fields are kept as-is; the new block goes at the end.
    pub fn append_garment_block(
        existing: &[MeasurementField],
        catalog: &MeasurementCatalog,
        garment_type: &str,
    ) -> Result<Vec<MeasurementField>, EngineError> {
        let mut fields = existing.to_vec();
        push_block(&mut fields, catalog, garment_type)?;
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_headers_and_fields() {
        let text = "=== SHIRT ===\nLength: 30\nChest: 40\n\n===== Pant =====:\nWaist: 34";
        let fields = MeasurementCodec::decode(text);
        assert_eq!(
            fields,
            vec![
                MeasurementField::header("SHIRT"),
                MeasurementField::field("Length", "30"),
                MeasurementField::field("Chest", "40"),
                MeasurementField::header("Pant"),
                MeasurementField::field("Waist", "34"),
            ]
        );
    }

    #[test]
    fn test_decode_splits_on_first_colon_only() {
        let fields = MeasurementCodec::decode("Note: 10:30 preferred");
        assert_eq!(fields, vec![MeasurementField::field("Note", "10:30 preferred")]);
    }

    #[test]
    fn test_decode_strips_quotes() {
        let fields = MeasurementCodec::decode("\"Sleeve\": '24.5'");
        assert_eq!(fields, vec![MeasurementField::field("Sleeve", "24.5")]);
    }

    #[test]
    fn test_decode_line_without_colon_is_label_only() {
        let fields = MeasurementCodec::decode("Slim fit");
        assert_eq!(fields, vec![MeasurementField::field("Slim fit", "")]);
    }

    #[test]
    fn test_decode_drops_blank_and_divider_lines() {
        let fields = MeasurementCodec::decode("\n   \n==========\n=== ===\nChest: 40\n");
        assert_eq!(fields, vec![MeasurementField::field("Chest", "40")]);
    }

    #[test]
    fn test_short_delimiter_is_not_a_header() {
        let fields = MeasurementCodec::decode("== Shirt ==");
        assert_eq!(fields, vec![MeasurementField::field("== Shirt ==", "")]);
    }

    #[test]
    fn test_header_title_trailing_colon_is_stripped() {
        let fields = MeasurementCodec::decode("=== Kurta: ===");
        assert_eq!(fields, vec![MeasurementField::header("Kurta")]);
    }

    #[test]
    fn test_encode_layout() {
        let fields = vec![
            MeasurementField::header("Shirt"),
            MeasurementField::field("Length", "30"),
            MeasurementField::field("Collar", ""),
            MeasurementField::header("Pant"),
            MeasurementField::field("Waist", "34"),
        ];
        assert_eq!(
            MeasurementCodec::encode(&fields),
            "=== Shirt ===\nLength: 30\nCollar:\n\n=== Pant ===\nWaist: 34"
        );
    }

    #[test]
    fn test_round_trip() {
        let fields = vec![
            MeasurementField::field("Height", "5'8"),
            MeasurementField::header("Coat"),
            MeasurementField::field("Chest", "42"),
            MeasurementField::field("Note", "10:30 trial"),
            MeasurementField::field("Lapel", ""),
            MeasurementField::header("Custom Section"),
            MeasurementField::field("Pocket", "2"),
        ];
        assert_eq!(
            MeasurementCodec::decode(&MeasurementCodec::encode(&fields)),
            fields
        );
    }

    #[test]
    fn test_decode_keeps_one_sided_quotes() {
        let fields = MeasurementCodec::decode("Chest: 40\"\nHeight: 5'8\"\nNeck: '15");
        assert_eq!(
            fields,
            vec![
                MeasurementField::field("Chest", "40\""),
                MeasurementField::field("Height", "5'8\""),
                MeasurementField::field("Neck", "'15"),
            ]
        );
    }

    #[test]
    fn test_decode_strips_only_one_quote_pair() {
        let fields = MeasurementCodec::decode("Note: \"'slim'\"\nCuff: \"a'");
        assert_eq!(
            fields,
            vec![
                MeasurementField::field("Note", "'slim'"),
                MeasurementField::field("Cuff", "\"a'"),
            ]
        );
    }

    #[test]
    fn test_round_trip_inch_and_foot_marks() {
        let fields = vec![
            MeasurementField::header("Shirt"),
            MeasurementField::field("Chest", "40\""),
            MeasurementField::field("Height", "5'8\""),
        ];
        assert_eq!(
            MeasurementCodec::decode(&MeasurementCodec::encode(&fields)),
            fields
        );
    }

    #[test]
    fn test_header_like_label_is_quoted_on_encode() {
        let fields = vec![
            MeasurementField::header("Shirt"),
            MeasurementField::field("=== Note ===", ""),
            MeasurementField::field("==", "x"),
        ];
        let text = MeasurementCodec::encode(&fields);
        assert_eq!(text, "=== Shirt ===\n\"=== Note ===\":\n\"==\": x");
        assert_eq!(MeasurementCodec::decode(&text), fields);
    }

    #[test]
    fn test_sections_groups_by_header() {
        let fields = MeasurementCodec::decode("Height: 170\n=== Shirt ===\nChest: 40\n=== Pant ===");
        let sections = MeasurementCodec::sections(&fields);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[1].title.as_deref(), Some("Shirt"));
        assert_eq!(sections[1].get("chest"), Some("40"));
        assert!(sections[2].fields.is_empty());
    }

    #[test]
    fn test_expand_standard_outfit() {
        let catalog = MeasurementCatalog::builtin();
        let outfit = catalog.outfit("Formal").unwrap();
        let fields = MeasurementCodec::expand_standard_outfit(catalog, outfit).unwrap();

        let headers: Vec<&str> = fields
            .iter()
            .filter(|f| f.is_header())
            .map(MeasurementField::label)
            .collect();
        assert_eq!(headers, vec!["Shirt", "Pant"]);
        let expected_len = 2
            + catalog.fields_for("Shirt").unwrap().len()
            + catalog.fields_for("Pant").unwrap().len();
        assert_eq!(fields.len(), expected_len);
        assert!(fields.iter().all(|f| f.value().is_empty()));
    }

    #[test]
    fn test_expand_rejects_unknown_garment() {
        let outfit = StandardOutfit {
            name: "Wedding".to_string(),
            garment_types: vec!["Shirt".to_string(), "Lehenga".to_string()],
        };
        let result = MeasurementCodec::expand_standard_outfit(MeasurementCatalog::builtin(), &outfit);
        assert!(matches!(result, Err(EngineError::UnknownGarmentType(g)) if g == "Lehenga"));
    }

    #[test]
    fn test_append_garment_block_preserves_existing() {
        let existing = vec![
            MeasurementField::header("Shirt"),
            MeasurementField::field("Chest", "40"),
        ];
        let fields =
            MeasurementCodec::append_garment_block(&existing, MeasurementCatalog::builtin(), "pajama")
                .unwrap();
        assert_eq!(&fields[..2], existing.as_slice());
        assert_eq!(fields[2], MeasurementField::header("Pajama"));
        assert_eq!(fields[3], MeasurementField::field("Length", ""));
    }
}
