//! The invoicing workflow itself.

use std::sync::Arc;

use bdn_shared::types::SaleId;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::afip::{self, AfipClient, ServerStatus, VoucherTypeInfo};
use crate::sales::{InvoicingState, SaleStatus};

use super::error::InvoicingError;
use super::store::SaleStore;
use super::types::{InvoiceStatusReport, IssuedInvoice, RecordedAuthorization};

/// Orchestrates invoice generation against the authority.
///
/// Voucher numbering is serialized per `(point of sale, voucher type)`
/// pair: the read-last-number-then-submit sequence holds a keyed lock so
/// two concurrent submissions cannot both derive the same next number.
/// The store's conditional write is the cross-process backstop.
pub struct InvoicingService<S, C> {
    store: S,
    afip: C,
    numbering_locks: DashMap<(u32, u32), Arc<Mutex<()>>>,
}

impl<S, C> InvoicingService<S, C>
where
    S: SaleStore,
    C: AfipClient,
{
    /// Creates the service over a sale store and an authority client.
    pub fn new(store: S, afip: C) -> Self {
        Self {
            store,
            afip,
            numbering_locks: DashMap::new(),
        }
    }

    /// Generates, submits, and records the electronic invoice for a sale.
    ///
    /// # Errors
    ///
    /// Returns an error when the sale is missing or ineligible, fails
    /// validation, the authority declines, or the granted authorization
    /// cannot be recorded locally (see
    /// [`InvoicingError::AuthorizedButUnrecorded`]).
    pub async fn generate_invoice(&self, sale_id: SaleId) -> Result<IssuedInvoice, InvoicingError> {
        // 1. Load the sale with customer and items.
        let (sale, customer) = self
            .store
            .load_for_invoicing(sale_id)
            .await?
            .ok_or(InvoicingError::SaleNotFound(sale_id))?;

        // 2. Eligibility guards, before any authority traffic.
        if !sale.is_white {
            return Err(InvoicingError::NotDeclared(sale_id));
        }
        if sale.status != SaleStatus::Confirmed {
            return Err(InvoicingError::NotConfirmed(sale_id));
        }
        match sale.invoicing_state {
            InvoicingState::Uninvoiced => {}
            InvoicingState::Invoiced => {
                return Err(InvoicingError::AlreadyInvoiced {
                    sale_id,
                    full_number: sale.invoice_full_number.unwrap_or_default(),
                    cae: sale.cae.unwrap_or_default(),
                });
            }
            InvoicingState::AuthorizedUnrecorded => {
                return Err(InvoicingError::PendingReview(sale_id));
            }
        }

        // 3. Pre-flight validation, all violations at once.
        afip::validate_sale(&sale, &customer).map_err(InvoicingError::Validation)?;

        // 4. Serialize numbering for this point-of-sale and voucher type.
        let voucher_type = afip::codes::voucher_code(sale.invoice_type);
        let lock = self.numbering_lock(sale.point_of_sale, voucher_type);
        let _guard = lock.lock().await;

        // 5. Next number is derived from the authority, not reserved.
        let last = self
            .afip
            .last_voucher_number(sale.point_of_sale, voucher_type)
            .await?;
        let next = last + 1;

        // 6. Single-shot submission. Failure leaves the sale uninvoiced
        //    and retryable.
        let request = afip::map_sale(&sale, &customer, next);
        let authorization = self.afip.authorize_voucher(&request).await?;

        // 7. Record the authorization in one conditional update.
        let recorded = RecordedAuthorization {
            voucher_number: authorization.voucher_number,
            full_number: afip::format_full_number(
                sale.invoice_type,
                sale.point_of_sale,
                authorization.voucher_number,
            ),
            cae: authorization.cae,
            cae_expiry: authorization.cae_expiry,
        };

        match self.store.record_authorization(sale_id, &recorded).await {
            Ok(true) => Ok(IssuedInvoice {
                sale_id,
                invoice_type: sale.invoice_type,
                point_of_sale: sale.point_of_sale,
                voucher_number: recorded.voucher_number,
                full_number: recorded.full_number,
                cae: recorded.cae,
                cae_expiry: recorded.cae_expiry,
                observations: authorization.observations,
            }),
            Ok(false) => Err(divergence(
                sale_id,
                recorded,
                "sale left the uninvoiced state while the authorization was in flight".to_string(),
            )),
            Err(err) => {
                let note = format!(
                    "CAE {} (voucher {}, expires {}) granted but not recorded: {err}",
                    recorded.cae, recorded.voucher_number, recorded.cae_expiry
                );
                // Best effort; the error below carries the full details
                // even if this flagging write also fails.
                let _ = self
                    .store
                    .mark_authorized_unrecorded(sale_id, &recorded, &note)
                    .await;
                Err(divergence(sale_id, recorded, err.to_string()))
            }
        }
    }

    /// Reports the local and authority-side state of a sale's invoice.
    ///
    /// # Errors
    ///
    /// Returns an error when the sale is missing or the authority lookup
    /// for a recorded voucher fails.
    pub async fn invoice_status(
        &self,
        sale_id: SaleId,
    ) -> Result<InvoiceStatusReport, InvoicingError> {
        let (sale, _customer) = self
            .store
            .load_for_invoicing(sale_id)
            .await?
            .ok_or(InvoicingError::SaleNotFound(sale_id))?;

        let recorded = match (
            sale.invoice_number,
            &sale.invoice_full_number,
            &sale.cae,
            sale.cae_expiry,
        ) {
            (Some(number), Some(full_number), Some(cae), Some(expiry)) => {
                Some(RecordedAuthorization {
                    voucher_number: number,
                    full_number: full_number.clone(),
                    cae: cae.clone(),
                    cae_expiry: expiry,
                })
            }
            _ => None,
        };

        let authority = match &recorded {
            Some(rec) => Some(
                self.afip
                    .voucher_info(
                        sale.point_of_sale,
                        afip::codes::voucher_code(sale.invoice_type),
                        rec.voucher_number,
                    )
                    .await?,
            ),
            None => None,
        };

        let matches = match (&recorded, &authority) {
            (Some(rec), Some(info)) => Some(info.cae.as_deref() == Some(rec.cae.as_str())),
            _ => None,
        };

        Ok(InvoiceStatusReport {
            sale_id,
            state: sale.invoicing_state,
            recorded,
            authority,
            matches,
        })
    }

    /// Voucher types the authority currently accepts. Passthrough.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be reached.
    pub async fn voucher_types(&self) -> Result<Vec<VoucherTypeInfo>, InvoicingError> {
        Ok(self.afip.voucher_types().await?)
    }

    /// Authority service health. Passthrough.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be reached.
    pub async fn server_status(&self) -> Result<ServerStatus, InvoicingError> {
        Ok(self.afip.server_status().await?)
    }

    fn numbering_lock(&self, point_of_sale: u32, voucher_type: u32) -> Arc<Mutex<()>> {
        self.numbering_locks
            .entry((point_of_sale, voucher_type))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn divergence(
    sale_id: SaleId,
    recorded: RecordedAuthorization,
    detail: String,
) -> InvoicingError {
    InvoicingError::AuthorizedButUnrecorded {
        sale_id,
        voucher_number: recorded.voucher_number,
        full_number: recorded.full_number,
        cae: recorded.cae,
        cae_expiry: recorded.cae_expiry,
        detail,
    }
}
