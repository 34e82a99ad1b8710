use doclens_core::{ContentHandler, MetadataKey, MetadataRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{2,4}\)|\d{2,4})[\s.-]?\d{3,4}[\s.-]?\d{3,4}")
        .expect("phone pattern is valid")
});

/// Phone-number-looking runs in `text`, reduced to digits (plus a leading
/// `+` when present), deduplicated in order of appearance.
pub fn extract_phone_numbers(text: &str, min_digits: usize) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for found in PHONE_PATTERN.find_iter(text) {
        let raw = found.as_str();
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < min_digits {
            continue;
        }
        let normalized = if raw.starts_with('+') {
            format!("+{}", digits)
        } else {
            digits
        };
        if !numbers.contains(&normalized) {
            numbers.push(normalized);
        }
    }
    numbers
}

/// Buffers the document text and records every phone number found under
/// `phonenumbers` when the document ends.
#[derive(Debug)]
pub struct PhoneExtractingHandler {
    text: String,
    min_digits: usize,
}

impl PhoneExtractingHandler {
    pub fn new(min_digits: usize) -> Self {
        Self {
            text: String::new(),
            min_digits,
        }
    }
}

impl Default for PhoneExtractingHandler {
    fn default() -> Self {
        Self::new(7)
    }
}

impl ContentHandler for PhoneExtractingHandler {
    fn characters(&mut self, text: &str) {
        self.text.push_str(text);
        // Element boundaries separate words.
        self.text.push(' ');
    }

    fn end_document(&mut self, metadata: &mut MetadataRecord) {
        for number in extract_phone_numbers(&self.text, self.min_digits) {
            metadata.add(MetadataKey::PhoneNumbers, number);
        }
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_formats() {
        let text = "Call (555) 123-4567 or +1 555.987.6543, fax 555-123-4567.";
        assert_eq!(
            extract_phone_numbers(text, 7),
            ["5551234567", "+15559876543"]
        );
    }

    #[test]
    fn test_dates_and_short_runs_are_ignored() {
        assert!(extract_phone_numbers("on 2020-01-01 at 10:15, room 42", 7).is_empty());
    }

    #[test]
    fn test_min_digits_threshold() {
        assert_eq!(extract_phone_numbers("ext 12 345 678", 7), ["12345678"]);
        assert!(extract_phone_numbers("ext 12 345 678", 9).is_empty());
    }

    #[test]
    fn test_handler_writes_on_end_document() {
        let mut handler = PhoneExtractingHandler::default();
        handler.characters("office: 555-010-9999");
        let mut metadata = MetadataRecord::new();
        handler.end_document(&mut metadata);
        assert_eq!(metadata.values(MetadataKey::PhoneNumbers), ["5550109999"]);
    }
}
