//! Ledger repository: the single posting primitive for the customer
//! current account, plus balance, statement and repair queries.
//!
//! All balance-affecting writes go through [`LedgerRepository::post_movement`].
//! The customer row is locked for the duration of the posting transaction,
//! so the read-increment-write of the sequence number and running balance
//! is serialized per customer; the `(customer_id, seq)` unique constraint
//! backstops competing writers from another process.

use bdn_core::ledger::{
    BalanceChain, Direction, LedgerEntry, LedgerError, MovementInput, PostedMovement, Statement,
    replay, validate_movement,
};
use bdn_core::sales::{CreditNote, Payment, Sale};
use bdn_shared::types::CustomerId;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{customers, ledger_entries, sea_orm_active_enums::LedgerDirection};

/// Ledger repository for current-account operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a single movement to a customer's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement fails validation, the customer or
    /// the reversed entry does not exist, a concurrent posting wins the
    /// sequence slot, or the database fails.
    pub async fn post_movement(&self, input: MovementInput) -> Result<PostedMovement, LedgerError> {
        // 1. Validate before touching the database
        validate_movement(&input)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;

        // 2. Lock the customer row; this serializes postings per customer
        let customer = customers::Entity::find_by_id(input.customer_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if customer.is_none() {
            return Err(LedgerError::CustomerNotFound(input.customer_id));
        }

        // 3. Check the reversal link, when present
        if let Some(reversed_id) = input.reverses_entry_id {
            let reversed = ledger_entries::Entity::find_by_id(reversed_id)
                .one(&txn)
                .await
                .map_err(map_db_err)?
                .ok_or(LedgerError::EntryNotFound(reversed_id))?;
            if reversed.customer_id != input.customer_id {
                return Err(LedgerError::ReversalCustomerMismatch {
                    entry_id: reversed_id,
                    customer_id: input.customer_id,
                });
            }
        }

        // 4. Extend the balance chain from the latest entry
        let last = last_entry(&txn, input.customer_id).await?;
        let previous_chain = last.map(chain_of);
        let chain = BalanceChain::apply(previous_chain.as_ref(), input.direction, input.amount);

        // 5. Insert the new entry
        let entry = ledger_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(input.customer_id),
            seq: Set(chain.seq),
            direction: Set(input.direction.into()),
            concept: Set(input.concept),
            amount: Set(input.amount),
            previous_balance: Set(chain.previous_balance),
            running_balance: Set(chain.running_balance),
            occurred_at: Set(input.occurred_at),
            created_at: Set(Utc::now().into()),
            reference: Set(input.reference),
            sale_id: Set(input.sale_id),
            payment_id: Set(input.payment_id),
            credit_note_id: Set(input.credit_note_id),
            reverses_entry_id: Set(input.reverses_entry_id),
        };
        let inserted = entry.insert(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(PostedMovement {
            entry: inserted.into(),
            previous_balance: chain.previous_balance,
            new_balance: chain.running_balance,
        })
    }

    /// Posts the debit movement for a sale, if the sale is confirmed.
    ///
    /// Draft and cancelled sales never reach the account; the caller gets
    /// `Ok(None)` rather than an error so confirmation flows can call this
    /// unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting fails.
    pub async fn post_sale_movement(
        &self,
        sale: &Sale,
    ) -> Result<Option<PostedMovement>, LedgerError> {
        if !sale.status.is_confirmed() {
            return Ok(None);
        }
        let posted = self.post_movement(MovementInput::for_sale(sale)).await?;
        Ok(Some(posted))
    }

    /// Posts the credit movement for a registered payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting fails.
    pub async fn post_payment_movement(
        &self,
        payment: &Payment,
    ) -> Result<PostedMovement, LedgerError> {
        self.post_movement(MovementInput::for_payment(payment)).await
    }

    /// Posts the credit movement for an issued credit note.
    ///
    /// The reversal link is taken from `reverses_entry_id` when the caller
    /// names an entry; otherwise, a note correcting a specific sale is
    /// linked to that sale's original debit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting fails.
    pub async fn post_credit_note_movement(
        &self,
        note: &CreditNote,
        reverses_entry_id: Option<Uuid>,
    ) -> Result<PostedMovement, LedgerError> {
        let reverses = match (reverses_entry_id, note.sale_id) {
            (Some(entry_id), _) => Some(entry_id),
            (None, Some(sale_id)) => self.find_sale_debit_entry(sale_id.into_inner()).await?,
            (None, None) => None,
        };
        self.post_movement(MovementInput::for_credit_note(note, reverses))
            .await
    }

    /// Returns the customer's current balance.
    ///
    /// The balance is the `running_balance` of the highest-`seq` entry;
    /// an account with no movements is at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or the query fails.
    pub async fn current_balance(&self, customer_id: Uuid) -> Result<Decimal, LedgerError> {
        self.ensure_customer(customer_id).await?;

        let last = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .order_by_desc(ledger_entries::Column::Seq)
            .limit(1)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(last.map_or(Decimal::ZERO, |entry| entry.running_balance))
    }

    /// Returns the customer's statement: the most recent movements plus
    /// the current balance.
    ///
    /// Entries are ordered by business date descending with the sequence
    /// number as tie breaker; the balance comes from the highest-`seq`
    /// entry regardless of the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or the query fails.
    pub async fn statement(
        &self,
        customer_id: Uuid,
        limit: u64,
    ) -> Result<Statement, LedgerError> {
        let balance = self.current_balance(customer_id).await?;

        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .order_by_desc(ledger_entries::Column::OccurredAt)
            .order_by_desc(ledger_entries::Column::Seq)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(Statement {
            customer_id: CustomerId::from_uuid(customer_id),
            entries: models.into_iter().map(LedgerEntry::from).collect(),
            balance,
        })
    }

    /// Recomputes the stored balance chain of an account from its
    /// movements, rewriting entries whose stored balances diverge.
    ///
    /// Returns the number of rewritten entries (0 for a consistent
    /// account; the operation is idempotent).
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or the rewrite
    /// fails.
    pub async fn recompute_balances(&self, customer_id: Uuid) -> Result<u64, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        // Same lock as posting, so no movement lands mid-replay
        let customer = customers::Entity::find_by_id(customer_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if customer.is_none() {
            return Err(LedgerError::CustomerNotFound(customer_id));
        }

        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .order_by_asc(ledger_entries::Column::Seq)
            .all(&txn)
            .await
            .map_err(map_db_err)?;

        let movements: Vec<(Direction, Decimal)> = models
            .iter()
            .map(|m| (m.direction.clone().into(), m.amount))
            .collect();
        let chains = replay(&movements);

        let mut rewritten = 0u64;
        for (model, chain) in models.into_iter().zip(chains) {
            if model.previous_balance == chain.previous_balance
                && model.running_balance == chain.running_balance
            {
                continue;
            }
            let mut active: ledger_entries::ActiveModel = model.into();
            active.previous_balance = Set(chain.previous_balance);
            active.running_balance = Set(chain.running_balance);
            active.update(&txn).await.map_err(map_db_err)?;
            rewritten += 1;
        }

        txn.commit().await.map_err(map_db_err)?;

        if rewritten > 0 {
            info!(%customer_id, rewritten, "Rewrote diverged account balances");
        }
        Ok(rewritten)
    }

    /// Finds the debit entry a sale posted at confirmation.
    async fn find_sale_debit_entry(&self, sale_id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        let entry = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::SaleId.eq(sale_id))
            .filter(ledger_entries::Column::Direction.eq(LedgerDirection::Debit))
            .order_by_asc(ledger_entries::Column::Seq)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(entry.map(|e| e.id))
    }

    async fn ensure_customer(&self, customer_id: Uuid) -> Result<(), LedgerError> {
        let exists = customers::Entity::find_by_id(customer_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(LedgerError::CustomerNotFound(customer_id))
        }
    }
}

/// Reads the balance chain an entry carries.
fn chain_of(model: ledger_entries::Model) -> BalanceChain {
    BalanceChain {
        seq: model.seq,
        previous_balance: model.previous_balance,
        running_balance: model.running_balance,
    }
}

/// Fetches the highest-`seq` entry of an account inside a transaction.
async fn last_entry(
    txn: &DatabaseTransaction,
    customer_id: Uuid,
) -> Result<Option<ledger_entries::Model>, LedgerError> {
    ledger_entries::Entity::find()
        .filter(ledger_entries::Column::CustomerId.eq(customer_id))
        .order_by_desc(ledger_entries::Column::Seq)
        .limit(1)
        .one(txn)
        .await
        .map_err(map_db_err)
}

/// Maps a database error into the ledger error space.
///
/// A unique violation on `(customer_id, seq)` means another writer took
/// the sequence slot between our read and our insert, which is the
/// retryable concurrent-posting case.
fn map_db_err(err: DbErr) -> LedgerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LedgerError::ConcurrentPosting,
        _ => LedgerError::Database(err.to_string()),
    }
}
