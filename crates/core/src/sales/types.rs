//! Domain types for sales, customers, payments and credit notes.

use bdn_shared::types::{CreditNoteId, CustomerId, PaymentId, SaleId, SaleItemId, round2};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer fiscal classification before the tax authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    /// Responsable inscripto - VAT-registered business.
    RegisteredResponsible,
    /// Monotributista - simplified small-taxpayer regime.
    Monotax,
    /// IVA-exempt entity.
    Exempt,
    /// Consumidor final - unregistered individual.
    FinalConsumer,
}

impl TaxCategory {
    /// Returns the snake_case string form used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegisteredResponsible => "registered_responsible",
            Self::Monotax => "monotax",
            Self::Exempt => "exempt",
            Self::FinalConsumer => "final_consumer",
        }
    }

    /// Invoice letter a VAT-registered issuer must use for this buyer.
    ///
    /// Registered-responsible buyers receive an A invoice (tax
    /// discriminated); everyone else receives a B.
    #[must_use]
    pub const fn invoice_type_for_sale(self) -> InvoiceType {
        match self {
            Self::RegisteredResponsible => InvoiceType::A,
            Self::Monotax | Self::Exempt | Self::FinalConsumer => InvoiceType::B,
        }
    }
}

/// A customer with a current account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// CUIT/CUIL/DNI as entered, separators allowed ("30-71234567-8").
    pub tax_id: Option<String>,
    /// Fiscal classification; required before electronic invoicing.
    pub tax_category: Option<TaxCategory>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Inactive customers keep their history but take no new documents.
    pub is_active: bool,
}

/// Sale lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Being drafted; items can still change.
    Draft,
    /// Confirmed; posted to the customer's account.
    Confirmed,
    /// Cancelled before confirmation.
    Cancelled,
}

impl SaleStatus {
    /// True when the sale can still be modified.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// True when the sale was confirmed.
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Invoice classification letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Between VAT-registered parties; tax discriminated.
    A,
    /// To final consumers, exempt or monotax buyers.
    B,
    /// Issued by monotax/exempt issuers.
    C,
}

impl InvoiceType {
    /// Returns the letter as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// IVA rate category of a sale line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IvaRate {
    /// 0% - taxed at zero rate (still reported as a tax bucket).
    Zero,
    /// 10.5% - reduced rate.
    TenHalf,
    /// 21% - general rate.
    TwentyOne,
    /// 27% - increased rate (utilities and similar).
    TwentySeven,
    /// Exempt operations (no bucket; reported as exempt amount).
    Exempt,
    /// Not taxed / out of scope (no bucket; reported as untaxed amount).
    NotTaxed,
}

impl IvaRate {
    /// Returns the snake_case string form used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::TenHalf => "ten_half",
            Self::TwentyOne => "twenty_one",
            Self::TwentySeven => "twenty_seven",
            Self::Exempt => "exempt",
            Self::NotTaxed => "not_taxed",
        }
    }

    /// The nominal percentage for this rate.
    #[must_use]
    pub fn percentage(self) -> Decimal {
        match self {
            Self::Zero | Self::Exempt | Self::NotTaxed => Decimal::ZERO,
            Self::TenHalf => Decimal::new(105, 1),
            Self::TwentyOne => Decimal::new(21, 0),
            Self::TwentySeven => Decimal::new(27, 0),
        }
    }

    /// True when line items of this rate are reported to the authority
    /// as entries of the tax-bucket array (including the 0% bucket).
    #[must_use]
    pub fn is_bucketed(self) -> bool {
        matches!(
            self,
            Self::Zero | Self::TenHalf | Self::TwentyOne | Self::TwentySeven
        )
    }

    /// IVA owed on a net amount at this rate, rounded to 2 decimals.
    #[must_use]
    pub fn iva_on(self, net: Decimal) -> Decimal {
        round2(net * self.percentage() / Decimal::ONE_HUNDRED)
    }
}

/// One line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    /// Unique identifier.
    pub id: SaleItemId,
    /// Owning sale.
    pub sale_id: SaleId,
    /// Free-text description of the product sold.
    pub description: String,
    /// Units sold.
    pub quantity: Decimal,
    /// Net unit price (tax excluded).
    pub unit_price: Decimal,
    /// IVA rate category for the line.
    pub iva_rate: IvaRate,
    /// Net line amount: `quantity * unit_price`, rounded to 2 decimals.
    pub net_amount: Decimal,
    /// IVA on the net amount, rounded to 2 decimals.
    pub iva_amount: Decimal,
}

impl SaleItem {
    /// Computes `(net_amount, iva_amount)` for a line.
    #[must_use]
    pub fn line_amounts(
        quantity: Decimal,
        unit_price: Decimal,
        rate: IvaRate,
    ) -> (Decimal, Decimal) {
        let net = round2(quantity * unit_price);
        (net, rate.iva_on(net))
    }
}

/// Electronic-invoicing state of a sale.
///
/// Explicit tagged state rather than inferring "invoiced" from the
/// presence of a CAE, so the post-authorization persistence failure is
/// representable and queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoicingState {
    /// Never submitted, or submission failed before authorization.
    Uninvoiced,
    /// Authorized by the tax authority and recorded locally. Terminal.
    Invoiced,
    /// The authority issued a CAE but the local write failed; needs
    /// manual reconciliation before any resubmission.
    AuthorizedUnrecorded,
}

impl InvoicingState {
    /// Returns the snake_case string form used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninvoiced => "uninvoiced",
            Self::Invoiced => "invoiced",
            Self::AuthorizedUnrecorded => "authorized_unrecorded",
        }
    }

    /// True when a submission to the authority may be attempted.
    #[must_use]
    pub fn can_submit(self) -> bool {
        matches!(self, Self::Uninvoiced)
    }

    /// True when the sale requires manual reconciliation.
    #[must_use]
    pub fn needs_review(self) -> bool {
        matches!(self, Self::AuthorizedUnrecorded)
    }
}

/// A sale to a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier.
    pub id: SaleId,
    /// Internal document number ("V-00000042").
    pub number: String,
    /// Buying customer.
    pub customer_id: CustomerId,
    /// Lifecycle status.
    pub status: SaleStatus,
    /// Declared ("white") sale, eligible for electronic invoicing.
    pub is_white: bool,
    /// Business date of the sale.
    pub sale_date: NaiveDate,
    /// Invoice letter for this sale.
    pub invoice_type: InvoiceType,
    /// Issuing point-of-sale code (1..=9998).
    pub point_of_sale: u32,
    /// Net amount taxed at some IVA rate (0% included).
    pub taxed_net: Decimal,
    /// Net amount outside the IVA scope ("no gravado").
    pub untaxed_net: Decimal,
    /// Net amount of exempt operations.
    pub exempt_amount: Decimal,
    /// Total IVA across all line items.
    pub iva_amount: Decimal,
    /// Gross-income tax perception, when withheld.
    pub gross_income_perception: Decimal,
    /// Grand total the customer owes for this sale.
    pub total: Decimal,
    /// Electronic-invoicing state.
    pub invoicing_state: InvoicingState,
    /// Authority-assigned voucher number, once authorized.
    pub invoice_number: Option<i64>,
    /// Formatted document number ("A 0001-00000042").
    pub invoice_full_number: Option<String>,
    /// Authorization code issued by the authority.
    pub cae: Option<String>,
    /// Expiry date of the CAE.
    pub cae_expiry: Option<NaiveDate>,
    /// Reconciliation note, set when authorization could not be recorded.
    pub invoicing_note: Option<String>,
    /// Line items.
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Sum of the fiscal components that must reconcile with `total`.
    #[must_use]
    pub fn fiscal_components_total(&self) -> Decimal {
        self.taxed_net
            + self.untaxed_net
            + self.exempt_amount
            + self.iva_amount
            + self.gross_income_perception
    }
}

/// Fiscal aggregates derived from a sale's line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleTotals {
    /// Net taxed at some IVA rate (0% included).
    pub taxed_net: Decimal,
    /// Net outside the IVA scope.
    pub untaxed_net: Decimal,
    /// Net of exempt operations.
    pub exempt_amount: Decimal,
    /// Total IVA.
    pub iva_amount: Decimal,
    /// Grand total including the gross-income perception.
    pub total: Decimal,
}

/// Aggregates line items into the sale's fiscal totals.
///
/// Keeping this in one place makes the arithmetic invariant (components
/// summing to the total within one cent) hold by construction for sales
/// created through the API.
#[must_use]
pub fn aggregate_totals(items: &[SaleItem], gross_income_perception: Decimal) -> SaleTotals {
    let mut taxed_net = Decimal::ZERO;
    let mut untaxed_net = Decimal::ZERO;
    let mut exempt_amount = Decimal::ZERO;
    let mut iva_amount = Decimal::ZERO;

    for item in items {
        match item.iva_rate {
            IvaRate::Exempt => exempt_amount += item.net_amount,
            IvaRate::NotTaxed => untaxed_net += item.net_amount,
            _ => taxed_net += item.net_amount,
        }
        iva_amount += item.iva_amount;
    }

    let total = taxed_net + untaxed_net + exempt_amount + iva_amount + gross_income_perception;
    SaleTotals {
        taxed_net,
        untaxed_net,
        exempt_amount,
        iva_amount,
        total,
    }
}

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Check.
    Check,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the lowercase string form used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

/// A payment received from a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// Internal document number ("PAG-000013").
    pub number: String,
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Amount received (positive).
    pub amount: Decimal,
    /// How the payment was received.
    pub method: PaymentMethod,
    /// Business date of the payment.
    pub payment_date: NaiveDate,
    /// External reference (transfer id, check number).
    pub reference: Option<String>,
}

/// A credit note issued in the customer's favor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditNote {
    /// Unique identifier.
    pub id: CreditNoteId,
    /// Internal document number ("NC-000007").
    pub number: String,
    /// Benefiting customer.
    pub customer_id: CustomerId,
    /// Sale being corrected, if the note relates to one.
    pub sale_id: Option<SaleId>,
    /// Amount credited (positive).
    pub amount: Decimal,
    /// Why the note was issued.
    pub reason: String,
    /// Business date of the note.
    pub note_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invoice_type_for_buyer() {
        assert_eq!(
            TaxCategory::RegisteredResponsible.invoice_type_for_sale(),
            InvoiceType::A
        );
        assert_eq!(TaxCategory::Monotax.invoice_type_for_sale(), InvoiceType::B);
        assert_eq!(TaxCategory::Exempt.invoice_type_for_sale(), InvoiceType::B);
        assert_eq!(
            TaxCategory::FinalConsumer.invoice_type_for_sale(),
            InvoiceType::B
        );
    }

    #[rstest]
    #[case(IvaRate::Zero, dec!(0))]
    #[case(IvaRate::TenHalf, dec!(10.5))]
    #[case(IvaRate::TwentyOne, dec!(21))]
    #[case(IvaRate::TwentySeven, dec!(27))]
    #[case(IvaRate::Exempt, dec!(0))]
    #[case(IvaRate::NotTaxed, dec!(0))]
    fn test_iva_percentage(#[case] rate: IvaRate, #[case] expected: Decimal) {
        assert_eq!(rate.percentage(), expected);
    }

    #[test]
    fn test_iva_on_rounds_to_cents() {
        // 333.33 at 21% = 69.9993 -> 70.00
        assert_eq!(IvaRate::TwentyOne.iva_on(dec!(333.33)), dec!(70.00));
        // 100.10 at 10.5% = 10.5105 -> 10.51
        assert_eq!(IvaRate::TenHalf.iva_on(dec!(100.10)), dec!(10.51));
        assert_eq!(IvaRate::Exempt.iva_on(dec!(500)), dec!(0.00));
    }

    #[test]
    fn test_line_amounts() {
        let (net, iva) = SaleItem::line_amounts(dec!(3), dec!(123.45), IvaRate::TwentyOne);
        assert_eq!(net, dec!(370.35));
        assert_eq!(iva, dec!(77.77)); // 77.7735 rounded
    }

    #[test]
    fn test_bucketed_rates() {
        assert!(IvaRate::Zero.is_bucketed());
        assert!(IvaRate::TenHalf.is_bucketed());
        assert!(IvaRate::TwentyOne.is_bucketed());
        assert!(IvaRate::TwentySeven.is_bucketed());
        assert!(!IvaRate::Exempt.is_bucketed());
        assert!(!IvaRate::NotTaxed.is_bucketed());
    }

    #[test]
    fn test_invoicing_state_transitions() {
        assert!(InvoicingState::Uninvoiced.can_submit());
        assert!(!InvoicingState::Invoiced.can_submit());
        assert!(!InvoicingState::AuthorizedUnrecorded.can_submit());
        assert!(InvoicingState::AuthorizedUnrecorded.needs_review());
        assert!(!InvoicingState::Invoiced.needs_review());
    }

    #[test]
    fn test_aggregate_totals_by_rate_class() {
        let sale_id = SaleId::new();
        let make = |rate: IvaRate, net: Decimal| {
            let iva = rate.iva_on(net);
            SaleItem {
                id: SaleItemId::new(),
                sale_id,
                description: "item".to_string(),
                quantity: dec!(1),
                unit_price: net,
                iva_rate: rate,
                net_amount: net,
                iva_amount: iva,
            }
        };

        let items = vec![
            make(IvaRate::TwentyOne, dec!(1000)),
            make(IvaRate::Zero, dec!(50)),
            make(IvaRate::Exempt, dec!(200)),
            make(IvaRate::NotTaxed, dec!(30)),
        ];

        let totals = aggregate_totals(&items, dec!(10));
        assert_eq!(totals.taxed_net, dec!(1050)); // 21% + 0% nets
        assert_eq!(totals.exempt_amount, dec!(200));
        assert_eq!(totals.untaxed_net, dec!(30));
        assert_eq!(totals.iva_amount, dec!(210.00));
        assert_eq!(totals.total, dec!(1500.00));
    }

    #[test]
    fn test_fiscal_components_reconcile_for_aggregated_sale() {
        let sale = crate::sales::test_support::sale_fixture();
        assert_eq!(sale.fiscal_components_total(), sale.total);
    }
}
