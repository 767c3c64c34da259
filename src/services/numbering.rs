//! Sequential document numbers for stock documents.
//!
//! Deliveries are numbered `WH/OUT/0001`, receipts `WH/IN/0001`. The next
//! number is derived from the most recently created document, so allocation
//! must happen inside the transaction that inserts the document.

pub const DELIVERY_PREFIX: &str = "WH/OUT/";
pub const RECEIPT_PREFIX: &str = "WH/IN/";

/// Format a document number from a prefix and sequence value.
pub fn format_document_number(prefix: &str, sequence: u32) -> String {
    format!("{}{:04}", prefix, sequence)
}

/// Derive the next sequence value from the last allocated document number.
/// Malformed numbers restart the sequence rather than failing the mutation.
pub fn next_sequence(last_number: Option<&str>) -> u32 {
    last_number
        .and_then(|n| n.rsplit('/').next())
        .and_then(|digits| digits.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_document_number(DELIVERY_PREFIX, 1), "WH/OUT/0001");
        assert_eq!(format_document_number(RECEIPT_PREFIX, 42), "WH/IN/0042");
        assert_eq!(format_document_number(DELIVERY_PREFIX, 12345), "WH/OUT/12345");
    }

    #[test]
    fn sequence_continues_from_last() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(next_sequence(Some("WH/OUT/0001")), 2);
        assert_eq!(next_sequence(Some("WH/OUT/0999")), 1000);
        assert_eq!(next_sequence(Some("WH/IN/9999")), 10000);
    }

    #[test]
    fn malformed_numbers_restart_sequence() {
        assert_eq!(next_sequence(Some("garbage")), 1);
        assert_eq!(next_sequence(Some("WH/OUT/")), 1);
    }
}
