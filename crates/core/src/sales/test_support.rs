//! Shared fixtures for crate tests.

use bdn_shared::types::{CreditNoteId, CustomerId, PaymentId, SaleId, SaleItemId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{
    CreditNote, Customer, InvoiceType, InvoicingState, IvaRate, Payment, PaymentMethod, Sale,
    SaleItem, SaleStatus, TaxCategory, aggregate_totals,
};

/// A VAT-registered customer with a well-formed CUIT.
#[must_use]
pub fn customer_fixture() -> Customer {
    Customer {
        id: CustomerId::new(),
        name: "Distribuidora Sur SRL".to_string(),
        tax_id: Some("30-71234567-8".to_string()),
        tax_category: Some(TaxCategory::RegisteredResponsible),
        email: Some("compras@distribuidorasur.com.ar".to_string()),
        phone: None,
        address: Some("Av. Rivadavia 1234, CABA".to_string()),
        is_active: true,
    }
}

/// An unregistered walk-in buyer without a tax identifier.
#[must_use]
pub fn final_consumer_fixture() -> Customer {
    Customer {
        id: CustomerId::new(),
        name: "Juan Pérez".to_string(),
        tax_id: None,
        tax_category: Some(TaxCategory::FinalConsumer),
        email: None,
        phone: None,
        address: None,
        is_active: true,
    }
}

fn item(sale_id: SaleId, description: &str, net: Decimal, rate: IvaRate) -> SaleItem {
    SaleItem {
        id: SaleItemId::new(),
        sale_id,
        description: description.to_string(),
        quantity: Decimal::ONE,
        unit_price: net,
        iva_rate: rate,
        net_amount: net,
        iva_amount: rate.iva_on(net),
    }
}

/// A confirmed, declared sale ready for invoicing.
///
/// Three items at rates {21%, 21%, 10.5%}: nets 1000 + 500 + 200,
/// IVA 210 + 105 + 21, total 2036.
#[must_use]
pub fn sale_fixture() -> Sale {
    let id = SaleId::new();
    let items = vec![
        item(id, "Auriculares BT-500", Decimal::new(1000, 0), IvaRate::TwentyOne),
        item(id, "Cargador rápido 65W", Decimal::new(500, 0), IvaRate::TwentyOne),
        item(id, "Yerba mate 1kg", Decimal::new(200, 0), IvaRate::TenHalf),
    ];
    let totals = aggregate_totals(&items, Decimal::ZERO);

    Sale {
        id,
        number: "V-00000042".to_string(),
        customer_id: CustomerId::new(),
        status: SaleStatus::Confirmed,
        is_white: true,
        sale_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        invoice_type: InvoiceType::A,
        point_of_sale: 1,
        taxed_net: totals.taxed_net,
        untaxed_net: totals.untaxed_net,
        exempt_amount: totals.exempt_amount,
        iva_amount: totals.iva_amount,
        gross_income_perception: Decimal::ZERO,
        total: totals.total,
        invoicing_state: InvoicingState::Uninvoiced,
        invoice_number: None,
        invoice_full_number: None,
        cae: None,
        cae_expiry: None,
        invoicing_note: None,
        items,
    }
}

/// A registered payment.
#[must_use]
pub fn payment_fixture() -> Payment {
    Payment {
        id: PaymentId::new(),
        number: "PAG-000013".to_string(),
        customer_id: CustomerId::new(),
        amount: Decimal::new(1000, 0),
        method: PaymentMethod::Transfer,
        payment_date: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        reference: Some("TRF-889123".to_string()),
    }
}

/// An issued credit note.
#[must_use]
pub fn credit_note_fixture() -> CreditNote {
    CreditNote {
        id: CreditNoteId::new(),
        number: "NC-000007".to_string(),
        customer_id: CustomerId::new(),
        sale_id: Some(SaleId::new()),
        amount: Decimal::new(500, 0),
        reason: "Devolución parcial".to_string(),
        note_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
    }
}
