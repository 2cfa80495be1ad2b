//! Fixed WSFEv1 code tables and field encodings.
//!
//! These values are defined by the authority's wire contract and never
//! change at runtime.

use chrono::{Datelike, NaiveDate};

use crate::sales::{InvoiceType, IvaRate};

/// Concept code for goods ("Productos").
pub const CONCEPT_PRODUCTS: u32 = 1;

/// Document type code for a CUIT tax identifier.
pub const DOC_TYPE_CUIT: u32 = 80;

/// Document type code for a DNI national identity number.
pub const DOC_TYPE_DNI: u32 = 96;

/// Document type code for an unidentified final consumer.
pub const DOC_TYPE_CONSUMER: u32 = 99;

/// Currency code for Argentine pesos.
pub const CURRENCY_PESO: &str = "PES";

/// Voucher type code for an invoice of the given classification.
#[must_use]
pub fn voucher_code(invoice_type: InvoiceType) -> u32 {
    match invoice_type {
        InvoiceType::A => 1,
        InvoiceType::B => 6,
        InvoiceType::C => 11,
    }
}

/// Voucher type code for a credit note of the given classification.
#[must_use]
pub fn credit_note_code(invoice_type: InvoiceType) -> u32 {
    match invoice_type {
        InvoiceType::A => 3,
        InvoiceType::B => 8,
        InvoiceType::C => 13,
    }
}

/// Authority code for a VAT rate bucket, or `None` for rates that are
/// reported through the exempt/untaxed totals instead of the bucket array.
#[must_use]
pub fn iva_code(rate: IvaRate) -> Option<u32> {
    match rate {
        IvaRate::Zero => Some(3),
        IvaRate::TenHalf => Some(4),
        IvaRate::TwentyOne => Some(5),
        IvaRate::TwentySeven => Some(6),
        IvaRate::Exempt | IvaRate::NotTaxed => None,
    }
}

/// Strips formatting separators from a tax identifier, keeping digits only.
///
/// `"30-71234567-8"` becomes `"30712345678"`.
#[must_use]
pub fn strip_tax_id(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Classifies a customer's tax identifier into the authority's
/// `(document type, document number)` pair.
///
/// An 11-digit identifier is a CUIT, 7 or 8 digits a DNI, anything else
/// (including absence) an unidentified consumer with document number 0.
#[must_use]
pub fn doc_type_for(tax_id: Option<&str>) -> (u32, i64) {
    let digits = tax_id.map(strip_tax_id).unwrap_or_default();
    match digits.len() {
        11 => digits
            .parse()
            .map_or((DOC_TYPE_CONSUMER, 0), |n| (DOC_TYPE_CUIT, n)),
        7 | 8 => digits
            .parse()
            .map_or((DOC_TYPE_CONSUMER, 0), |n| (DOC_TYPE_DNI, n)),
        _ => (DOC_TYPE_CONSUMER, 0),
    }
}

/// Encodes a business date as the authority's `YYYYMMDD` integer.
#[must_use]
pub fn encode_date(date: NaiveDate) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or(0);
    year * 10_000 + date.month() * 100 + date.day()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(InvoiceType::A, 1)]
    #[case(InvoiceType::B, 6)]
    #[case(InvoiceType::C, 11)]
    fn voucher_codes_match_wsfe_tables(#[case] invoice_type: InvoiceType, #[case] expected: u32) {
        assert_eq!(voucher_code(invoice_type), expected);
    }

    #[rstest]
    #[case(InvoiceType::A, 3)]
    #[case(InvoiceType::B, 8)]
    #[case(InvoiceType::C, 13)]
    fn credit_note_codes_match_wsfe_tables(
        #[case] invoice_type: InvoiceType,
        #[case] expected: u32,
    ) {
        assert_eq!(credit_note_code(invoice_type), expected);
    }

    #[rstest]
    #[case(IvaRate::Zero, Some(3))]
    #[case(IvaRate::TenHalf, Some(4))]
    #[case(IvaRate::TwentyOne, Some(5))]
    #[case(IvaRate::TwentySeven, Some(6))]
    #[case(IvaRate::Exempt, None)]
    #[case(IvaRate::NotTaxed, None)]
    fn iva_codes_match_wsfe_tables(#[case] rate: IvaRate, #[case] expected: Option<u32>) {
        assert_eq!(iva_code(rate), expected);
    }

    #[test]
    fn strip_tax_id_removes_separators() {
        assert_eq!(strip_tax_id("30-71234567-8"), "30712345678");
        assert_eq!(strip_tax_id("20.12345678.9"), "20123456789");
        assert_eq!(strip_tax_id(""), "");
    }

    #[rstest]
    #[case(Some("30-71234567-8"), DOC_TYPE_CUIT, 30_712_345_678)]
    #[case(Some("20123456789"), DOC_TYPE_CUIT, 20_123_456_789)]
    #[case(Some("12345678"), DOC_TYPE_DNI, 12_345_678)]
    #[case(Some("1234567"), DOC_TYPE_DNI, 1_234_567)]
    #[case(Some("123"), DOC_TYPE_CONSUMER, 0)]
    #[case(Some("sin datos"), DOC_TYPE_CONSUMER, 0)]
    #[case(None, DOC_TYPE_CONSUMER, 0)]
    fn doc_type_classification(
        #[case] tax_id: Option<&str>,
        #[case] expected_type: u32,
        #[case] expected_number: i64,
    ) {
        assert_eq!(doc_type_for(tax_id), (expected_type, expected_number));
    }

    #[test]
    fn encode_date_is_yyyymmdd() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(encode_date(date), 20_260_825);

        let first = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(encode_date(first), 20_260_102);
    }
}
