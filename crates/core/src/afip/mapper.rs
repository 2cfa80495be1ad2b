//! Pure translation of a domain sale into the authority's voucher schema.
//!
//! No I/O and no mutation: given the same sale, customer, and voucher
//! number, the mapping is deterministic field by field.

use bdn_shared::types::round2;
use rust_decimal::Decimal;

use crate::sales::{Customer, InvoiceType, Sale, SaleItem};

use super::codes;
use super::request::{IvaBucket, VoucherRequest};

/// Maps a sale to a single-voucher authorization request.
///
/// `voucher_number` is the next number for the sale's point-of-sale and
/// voucher type, obtained from the authority by the orchestrator; the
/// mapper takes it as-is.
#[must_use]
pub fn map_sale(sale: &Sale, customer: &Customer, voucher_number: i64) -> VoucherRequest {
    let (doc_type, doc_number) = codes::doc_type_for(customer.tax_id.as_deref());

    VoucherRequest {
        voucher_count: 1,
        point_of_sale: sale.point_of_sale,
        voucher_type: codes::voucher_code(sale.invoice_type),
        concept: codes::CONCEPT_PRODUCTS,
        doc_type,
        doc_number,
        voucher_from: voucher_number,
        voucher_to: voucher_number,
        voucher_date: codes::encode_date(sale.sale_date),
        total: round2(sale.total),
        untaxed_net: round2(sale.untaxed_net),
        taxed_net: round2(sale.taxed_net),
        exempt: round2(sale.exempt_amount),
        iva: round2(sale.iva_amount),
        other_taxes: round2(sale.gross_income_perception),
        currency: codes::CURRENCY_PESO.to_string(),
        exchange_rate: Decimal::ONE,
        iva_buckets: aggregate_iva_buckets(&sale.items),
    }
}

/// Groups line items into one aggregate bucket per distinct VAT rate.
///
/// Bucket order is the insertion order of each rate's first occurrence,
/// not sorted by code. Exempt and untaxed lines carry no bucket; they
/// are reported through the voucher's exempt/untaxed totals instead.
#[must_use]
pub fn aggregate_iva_buckets(items: &[SaleItem]) -> Vec<IvaBucket> {
    let mut buckets: Vec<(u32, Decimal, Decimal)> = Vec::new();

    for item in items {
        let Some(code) = codes::iva_code(item.iva_rate) else {
            continue;
        };
        match buckets.iter_mut().find(|(id, _, _)| *id == code) {
            Some((_, base, tax)) => {
                *base += item.net_amount;
                *tax += item.iva_amount;
            }
            None => buckets.push((code, item.net_amount, item.iva_amount)),
        }
    }

    buckets
        .into_iter()
        .map(|(id, base, tax)| IvaBucket {
            id,
            base_amount: round2(base),
            tax_amount: round2(tax),
        })
        .collect()
}

/// Formats the human-readable document number, e.g. `A 0001-00000042`.
#[must_use]
pub fn format_full_number(
    invoice_type: InvoiceType,
    point_of_sale: u32,
    voucher_number: i64,
) -> String {
    format!(
        "{} {:04}-{:08}",
        invoice_type.as_str(),
        point_of_sale,
        voucher_number
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::sales::IvaRate;
    use crate::sales::test_support::{customer_fixture, final_consumer_fixture, sale_fixture};

    use super::*;

    #[test]
    fn buckets_aggregate_per_rate_not_per_item() {
        let sale = sale_fixture();

        let buckets = aggregate_iva_buckets(&sale.items);

        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[0],
            IvaBucket {
                id: 5,
                base_amount: dec!(1500.00),
                tax_amount: dec!(315.00),
            }
        );
        assert_eq!(
            buckets[1],
            IvaBucket {
                id: 4,
                base_amount: dec!(200.00),
                tax_amount: dec!(21.00),
            }
        );
    }

    #[test]
    fn bucket_order_follows_first_occurrence_not_code() {
        let mut sale = sale_fixture();
        sale.items.reverse();

        let codes: Vec<u32> = aggregate_iva_buckets(&sale.items)
            .into_iter()
            .map(|b| b.id)
            .collect();

        assert_eq!(codes, vec![4, 5]);
    }

    #[test]
    fn exempt_lines_produce_no_bucket() {
        let mut sale = sale_fixture();
        for item in &mut sale.items {
            item.iva_rate = IvaRate::Exempt;
            item.iva_amount = dec!(0);
        }

        assert!(aggregate_iva_buckets(&sale.items).is_empty());
    }

    #[test]
    fn maps_registered_customer_sale() {
        let sale = sale_fixture();
        let customer = customer_fixture();

        let request = map_sale(&sale, &customer, 42);

        assert_eq!(request.voucher_count, 1);
        assert_eq!(request.point_of_sale, 1);
        assert_eq!(request.voucher_type, 1);
        assert_eq!(request.concept, codes::CONCEPT_PRODUCTS);
        assert_eq!(request.doc_type, codes::DOC_TYPE_CUIT);
        assert_eq!(request.doc_number, 30_712_345_678);
        assert_eq!(request.voucher_from, 42);
        assert_eq!(request.voucher_to, 42);
        assert_eq!(request.voucher_date, 20_260_310);
        assert_eq!(request.total, dec!(2036.00));
        assert_eq!(request.taxed_net, dec!(1700.00));
        assert_eq!(request.untaxed_net, dec!(0.00));
        assert_eq!(request.exempt, dec!(0.00));
        assert_eq!(request.iva, dec!(336.00));
        assert_eq!(request.other_taxes, dec!(0.00));
        assert_eq!(request.currency, "PES");
        assert_eq!(request.exchange_rate, Decimal::ONE);
        assert_eq!(request.iva_buckets.len(), 2);
    }

    #[test]
    fn maps_final_consumer_as_unidentified() {
        let sale = sale_fixture();
        let customer = final_consumer_fixture();

        let request = map_sale(&sale, &customer, 7);

        assert_eq!(request.doc_type, codes::DOC_TYPE_CONSUMER);
        assert_eq!(request.doc_number, 0);
    }

    #[test]
    fn full_number_is_letter_pos_and_zero_padded_sequence() {
        assert_eq!(format_full_number(InvoiceType::A, 1, 42), "A 0001-00000042");
        assert_eq!(
            format_full_number(InvoiceType::B, 12, 1234),
            "B 0012-00001234"
        );
        assert_eq!(
            format_full_number(InvoiceType::C, 9998, 99_999_999),
            "C 9998-99999999"
        );
    }
}
