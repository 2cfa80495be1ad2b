//! Workflow tests over a mocked authority client and an in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use bdn_shared::types::SaleId;
use chrono::NaiveDate;
use mockall::predicate::eq;
use rust_decimal_macros::dec;

use crate::afip::client::MockAfipClient;
use crate::afip::{AfipError, FiscalValidationError, VoucherAuthorization, VoucherInfo};
use crate::sales::test_support::{customer_fixture, sale_fixture};
use crate::sales::{Customer, InvoicingState, Sale};

use super::error::InvoicingError;
use super::service::InvoicingService;
use super::store::{MockSaleStore, SaleStore, StoreError};
use super::types::RecordedAuthorization;

#[derive(Clone, Default)]
struct FakeStore {
    inner: Arc<FakeStoreInner>,
}

#[derive(Default)]
struct FakeStoreInner {
    sales: Mutex<HashMap<SaleId, (Sale, Customer)>>,
    fail_recording: AtomicBool,
    refuse_recording: AtomicBool,
    notes: Mutex<Vec<String>>,
}

impl FakeStore {
    fn with_sale(sale: Sale, customer: Customer) -> (Self, SaleId) {
        let store = Self::default();
        let id = store.add_sale(sale, customer);
        (store, id)
    }

    fn add_sale(&self, sale: Sale, customer: Customer) -> SaleId {
        let id = sale.id;
        self.inner
            .sales
            .lock()
            .unwrap()
            .insert(id, (sale, customer));
        id
    }

    fn sale(&self, id: SaleId) -> Sale {
        self.inner.sales.lock().unwrap()[&id].0.clone()
    }

    fn fail_recording(&self) {
        self.inner.fail_recording.store(true, Ordering::SeqCst);
    }

    fn refuse_recording(&self) {
        self.inner.refuse_recording.store(true, Ordering::SeqCst);
    }

    fn notes(&self) -> Vec<String> {
        self.inner.notes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SaleStore for FakeStore {
    async fn load_for_invoicing(
        &self,
        sale_id: SaleId,
    ) -> Result<Option<(Sale, Customer)>, StoreError> {
        Ok(self.inner.sales.lock().unwrap().get(&sale_id).cloned())
    }

    async fn record_authorization(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
    ) -> Result<bool, StoreError> {
        if self.inner.fail_recording.load(Ordering::SeqCst) {
            return Err(StoreError("simulated write failure".to_string()));
        }
        if self.inner.refuse_recording.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut sales = self.inner.sales.lock().unwrap();
        let Some((sale, _)) = sales.get_mut(&sale_id) else {
            return Ok(false);
        };
        if sale.invoicing_state != InvoicingState::Uninvoiced {
            return Ok(false);
        }

        sale.invoicing_state = InvoicingState::Invoiced;
        sale.invoice_number = Some(authorization.voucher_number);
        sale.invoice_full_number = Some(authorization.full_number.clone());
        sale.cae = Some(authorization.cae.clone());
        sale.cae_expiry = Some(authorization.cae_expiry);
        Ok(true)
    }

    async fn mark_authorized_unrecorded(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
        note: &str,
    ) -> Result<(), StoreError> {
        let mut sales = self.inner.sales.lock().unwrap();
        if let Some((sale, _)) = sales.get_mut(&sale_id) {
            if sale.invoicing_state == InvoicingState::Uninvoiced {
                sale.invoicing_state = InvoicingState::AuthorizedUnrecorded;
                sale.invoice_number = Some(authorization.voucher_number);
                sale.invoice_full_number = Some(authorization.full_number.clone());
                sale.cae = Some(authorization.cae.clone());
                sale.cae_expiry = Some(authorization.cae_expiry);
                sale.invoicing_note = Some(note.to_string());
            }
        }
        self.inner.notes.lock().unwrap().push(note.to_string());
        Ok(())
    }
}

fn granted(voucher_number: i64) -> VoucherAuthorization {
    VoucherAuthorization {
        cae: "75123456789012".to_string(),
        cae_expiry: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        voucher_number,
        observations: Vec::new(),
    }
}

#[tokio::test]
async fn issues_records_and_formats_the_invoice() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .with(eq(1u32), eq(1u32))
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher()
        .withf(|request| request.voucher_from == 42 && request.voucher_to == 42)
        .times(1)
        .returning(|request| Ok(granted(request.voucher_from)));
    let service = InvoicingService::new(store.clone(), afip);

    let invoice = service.generate_invoice(sale_id).await.unwrap();

    assert_eq!(invoice.voucher_number, 42);
    assert_eq!(invoice.full_number, "A 0001-00000042");
    assert_eq!(invoice.cae, "75123456789012");

    let sale = store.sale(sale_id);
    assert_eq!(sale.invoicing_state, InvoicingState::Invoiced);
    assert_eq!(sale.invoice_number, Some(42));
    assert_eq!(sale.invoice_full_number.as_deref(), Some("A 0001-00000042"));
    assert_eq!(sale.cae.as_deref(), Some("75123456789012"));
}

#[tokio::test]
async fn repeat_submission_conflicts_without_a_second_authority_call() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher()
        .times(1)
        .returning(|request| Ok(granted(request.voucher_from)));
    let service = InvoicingService::new(store.clone(), afip);

    service.generate_invoice(sale_id).await.unwrap();
    let err = service.generate_invoice(sale_id).await.unwrap_err();

    match err {
        InvoicingError::AlreadyInvoiced {
            full_number, cae, ..
        } => {
            assert_eq!(full_number, "A 0001-00000042");
            assert_eq!(cae, "75123456789012");
        }
        other => panic!("expected AlreadyInvoiced, got {other:?}"),
    }
}

#[tokio::test]
async fn already_invoiced_sale_returns_existing_details() {
    let mut sale = sale_fixture();
    sale.invoicing_state = InvoicingState::Invoiced;
    sale.invoice_number = Some(7);
    sale.invoice_full_number = Some("A 0001-00000007".to_string());
    sale.cae = Some("12345ABCDE".to_string());
    sale.cae_expiry = NaiveDate::from_ymd_opt(2026, 4, 10);
    let (store, sale_id) = FakeStore::with_sale(sale, customer_fixture());

    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number().times(0);
    afip.expect_authorize_voucher().times(0);
    let service = InvoicingService::new(store, afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    match err {
        InvoicingError::AlreadyInvoiced { cae, .. } => assert_eq!(cae, "12345ABCDE"),
        other => panic!("expected AlreadyInvoiced, got {other:?}"),
    }
}

#[tokio::test]
async fn arithmetic_mismatch_stops_before_the_authority() {
    let mut sale = sale_fixture();
    sale.total += dec!(130);
    let (store, sale_id) = FakeStore::with_sale(sale, customer_fixture());

    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number().times(0);
    afip.expect_authorize_voucher().times(0);
    let service = InvoicingService::new(store, afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    match err {
        InvoicingError::Validation(errors) => {
            assert!(matches!(
                errors.as_slice(),
                [FiscalValidationError::ArithmeticMismatch { .. }]
            ));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn undeclared_sale_is_rejected_without_side_effects() {
    let mut sale = sale_fixture();
    sale.is_white = false;
    let (store, sale_id) = FakeStore::with_sale(sale, customer_fixture());

    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number().times(0);
    afip.expect_authorize_voucher().times(0);
    let service = InvoicingService::new(store.clone(), afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    assert!(matches!(err, InvoicingError::NotDeclared(id) if id == sale_id));
    let sale = store.sale(sale_id);
    assert_eq!(sale.invoicing_state, InvoicingState::Uninvoiced);
    assert!(sale.cae.is_none());
}

#[tokio::test]
async fn draft_sale_is_not_invoiceable() {
    let mut sale = sale_fixture();
    sale.status = crate::sales::SaleStatus::Draft;
    let (store, sale_id) = FakeStore::with_sale(sale, customer_fixture());

    let service = InvoicingService::new(store, MockAfipClient::new());
    let err = service.generate_invoice(sale_id).await.unwrap_err();

    assert!(matches!(err, InvoicingError::NotConfirmed(_)));
}

#[tokio::test]
async fn missing_sale_is_reported() {
    let mut store = MockSaleStore::new();
    store
        .expect_load_for_invoicing()
        .returning(|_| Ok(None));
    let service = InvoicingService::new(store, MockAfipClient::new());

    let err = service.generate_invoice(SaleId::new()).await.unwrap_err();

    assert!(matches!(err, InvoicingError::SaleNotFound(_)));
}

#[tokio::test]
async fn authority_rejection_leaves_the_sale_retryable() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher().times(1).returning(|_| {
        Err(AfipError::Rejected {
            message: "voucher date out of range".to_string(),
            observations: vec!["10016: CbteFch invalido".to_string()],
        })
    });
    let service = InvoicingService::new(store.clone(), afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    assert!(matches!(err, InvoicingError::Afip(AfipError::Rejected { .. })));
    let sale = store.sale(sale_id);
    assert_eq!(sale.invoicing_state, InvoicingState::Uninvoiced);
    assert!(sale.cae.is_none());
}

#[tokio::test]
async fn recording_failure_is_loud_and_flags_the_sale() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    store.fail_recording();
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher()
        .times(1)
        .returning(|request| Ok(granted(request.voucher_from)));
    let service = InvoicingService::new(store.clone(), afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    match err {
        InvoicingError::AuthorizedButUnrecorded {
            voucher_number,
            cae,
            ..
        } => {
            assert_eq!(voucher_number, 42);
            assert_eq!(cae, "75123456789012");
        }
        other => panic!("expected AuthorizedButUnrecorded, got {other:?}"),
    }

    let notes = store.notes();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("75123456789012"));
}

#[tokio::test]
async fn flagged_sale_blocks_resubmission() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    store.fail_recording();
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher()
        .times(1)
        .returning(|request| Ok(granted(request.voucher_from)));
    let service = InvoicingService::new(store.clone(), afip);

    // First attempt authorizes but cannot record. The fake still flags
    // the sale for review, so the retry must stop at the guard instead
    // of requesting a second CAE.
    service.generate_invoice(sale_id).await.unwrap_err();
    assert_eq!(
        store.sale(sale_id).invoicing_state,
        InvoicingState::AuthorizedUnrecorded
    );

    let err = service.generate_invoice(sale_id).await.unwrap_err();
    assert!(matches!(err, InvoicingError::PendingReview(id) if id == sale_id));
}

#[tokio::test]
async fn conflicting_concurrent_record_is_surfaced() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    store.refuse_recording();
    let mut afip = MockAfipClient::new();
    afip.expect_last_voucher_number()
        .times(1)
        .returning(|_, _| Ok(41));
    afip.expect_authorize_voucher()
        .times(1)
        .returning(|request| Ok(granted(request.voucher_from)));
    let service = InvoicingService::new(store.clone(), afip);

    let err = service.generate_invoice(sale_id).await.unwrap_err();

    match err {
        InvoicingError::AuthorizedButUnrecorded { detail, .. } => {
            assert!(detail.contains("uninvoiced"));
        }
        other => panic!("expected AuthorizedButUnrecorded, got {other:?}"),
    }
    assert!(store.notes().is_empty());
}

#[tokio::test]
async fn status_of_uninvoiced_sale_skips_the_authority() {
    let (store, sale_id) = FakeStore::with_sale(sale_fixture(), customer_fixture());
    let mut afip = MockAfipClient::new();
    afip.expect_voucher_info().times(0);
    let service = InvoicingService::new(store, afip);

    let report = service.invoice_status(sale_id).await.unwrap();

    assert_eq!(report.state, InvoicingState::Uninvoiced);
    assert!(report.recorded.is_none());
    assert!(report.authority.is_none());
    assert_eq!(report.matches, None);
}

#[tokio::test]
async fn status_compares_local_and_authority_cae() {
    let mut sale = sale_fixture();
    sale.invoicing_state = InvoicingState::Invoiced;
    sale.invoice_number = Some(42);
    sale.invoice_full_number = Some("A 0001-00000042".to_string());
    sale.cae = Some("75123456789012".to_string());
    sale.cae_expiry = NaiveDate::from_ymd_opt(2026, 9, 4);
    let (store, sale_id) = FakeStore::with_sale(sale, customer_fixture());

    let mut afip = MockAfipClient::new();
    afip.expect_voucher_info()
        .with(eq(1u32), eq(1u32), eq(42i64))
        .times(1)
        .returning(|_, _, number| {
            Ok(VoucherInfo {
                voucher_number: number,
                cae: Some("75123456789012".to_string()),
                cae_expiry: NaiveDate::from_ymd_opt(2026, 9, 4),
                voucher_date: NaiveDate::from_ymd_opt(2026, 3, 10),
                total: Some(dec!(2036.00)),
            })
        });
    let service = InvoicingService::new(store, afip);

    let report = service.invoice_status(sale_id).await.unwrap();

    assert_eq!(report.state, InvoicingState::Invoiced);
    assert_eq!(report.recorded.unwrap().voucher_number, 42);
    assert_eq!(report.matches, Some(true));
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_numbers() {
    let store = FakeStore::default();
    let id_a = store.add_sale(sale_fixture(), customer_fixture());
    let id_b = store.add_sale(sale_fixture(), customer_fixture());

    let issued: Arc<Mutex<Vec<i64>>> = Arc::default();
    let last = Arc::new(AtomicI64::new(41));

    let mut afip = MockAfipClient::new();
    {
        let last = Arc::clone(&last);
        afip.expect_last_voucher_number()
            .times(2)
            .returning(move |_, _| Ok(last.load(Ordering::SeqCst)));
    }
    {
        let last = Arc::clone(&last);
        let issued = Arc::clone(&issued);
        afip.expect_authorize_voucher()
            .times(2)
            .returning(move |request| {
                last.store(request.voucher_from, Ordering::SeqCst);
                issued.lock().unwrap().push(request.voucher_from);
                Ok(granted(request.voucher_from))
            });
    }
    let service = InvoicingService::new(store.clone(), afip);

    let (a, b) = tokio::join!(
        service.generate_invoice(id_a),
        service.generate_invoice(id_b)
    );
    a.unwrap();
    b.unwrap();

    let mut numbers = issued.lock().unwrap().clone();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![42, 43]);

    let mut recorded = vec![
        store.sale(id_a).invoice_number.unwrap(),
        store.sale(id_b).invoice_number.unwrap(),
    ];
    recorded.sort_unstable();
    assert_eq!(recorded, vec![42, 43]);
}
