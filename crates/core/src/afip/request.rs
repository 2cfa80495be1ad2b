//! Voucher request payload and authority response types.
//!
//! [`VoucherRequest`] serializes with the authority's official WSFEv1
//! field names; the remaining types are the decoded, domain-facing
//! views of gateway responses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single voucher authorization request (`FECAESolicitar` detail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherRequest {
    /// Number of vouchers in the batch, always 1 here.
    #[serde(rename = "CantReg")]
    pub voucher_count: u32,
    /// Issuing point of sale.
    #[serde(rename = "PtoVta")]
    pub point_of_sale: u32,
    /// Voucher type code (1 = invoice A, 6 = invoice B, 11 = invoice C).
    #[serde(rename = "CbteTipo")]
    pub voucher_type: u32,
    /// Concept code (1 = goods).
    #[serde(rename = "Concepto")]
    pub concept: u32,
    /// Receiver document type code (80 = CUIT, 96 = DNI, 99 = consumer).
    #[serde(rename = "DocTipo")]
    pub doc_type: u32,
    /// Receiver document number, 0 for an unidentified consumer.
    #[serde(rename = "DocNro")]
    pub doc_number: i64,
    /// First voucher number covered by this request.
    #[serde(rename = "CbteDesde")]
    pub voucher_from: i64,
    /// Last voucher number covered by this request (equals `voucher_from`).
    #[serde(rename = "CbteHasta")]
    pub voucher_to: i64,
    /// Voucher date encoded as `YYYYMMDD`.
    #[serde(rename = "CbteFch")]
    pub voucher_date: u32,
    /// Grand total.
    #[serde(rename = "ImpTotal")]
    pub total: Decimal,
    /// Net amount not reached by VAT.
    #[serde(rename = "ImpTotConc")]
    pub untaxed_net: Decimal,
    /// Net amount subject to VAT.
    #[serde(rename = "ImpNeto")]
    pub taxed_net: Decimal,
    /// VAT-exempt amount.
    #[serde(rename = "ImpOpEx")]
    pub exempt: Decimal,
    /// Total VAT.
    #[serde(rename = "ImpIVA")]
    pub iva: Decimal,
    /// Other tributes (gross income perceptions).
    #[serde(rename = "ImpTrib")]
    pub other_taxes: Decimal,
    /// Currency code, always `PES`.
    #[serde(rename = "MonId")]
    pub currency: String,
    /// Exchange rate, 1 for pesos.
    #[serde(rename = "MonCotiz")]
    pub exchange_rate: Decimal,
    /// One aggregate per distinct VAT rate used, omitted when empty.
    #[serde(rename = "Iva", default, skip_serializing_if = "Vec::is_empty")]
    pub iva_buckets: Vec<IvaBucket>,
}

/// Aggregate VAT amounts for one rate code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvaBucket {
    /// Authority rate code (3 = 0%, 4 = 10.5%, 5 = 21%, 6 = 27%).
    #[serde(rename = "Id")]
    pub id: u32,
    /// Summed taxable base at this rate.
    #[serde(rename = "BaseImp")]
    pub base_amount: Decimal,
    /// Summed VAT at this rate.
    #[serde(rename = "Importe")]
    pub tax_amount: Decimal,
}

/// A granted authorization (CAE) for one voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherAuthorization {
    /// Electronic authorization code.
    pub cae: String,
    /// Date after which the CAE is no longer valid.
    pub cae_expiry: NaiveDate,
    /// Voucher number the authorization covers.
    pub voucher_number: i64,
    /// Non-fatal observations attached by the authority.
    pub observations: Vec<String>,
}

/// Authority-side view of an already-issued voucher (`FECompConsultar`).
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherInfo {
    /// Voucher number as registered by the authority.
    pub voucher_number: i64,
    /// Authorization code, if one was granted.
    pub cae: Option<String>,
    /// CAE expiry date, if one was granted.
    pub cae_expiry: Option<NaiveDate>,
    /// Voucher date as registered.
    pub voucher_date: Option<NaiveDate>,
    /// Registered grand total.
    pub total: Option<Decimal>,
}

/// One voucher type from the authority's parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoucherTypeInfo {
    /// Authority voucher type code.
    pub id: u32,
    /// Human-readable description.
    pub description: String,
}

/// Health of the authority's three backend services (`FEDummy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    /// Application server status, `OK` when healthy.
    pub app_server: String,
    /// Database server status.
    pub db_server: String,
    /// Authentication server status.
    pub auth_server: String,
}

impl ServerStatus {
    /// Whether all three authority services report healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.app_server == "OK" && self.db_server == "OK" && self.auth_server == "OK"
    }
}
