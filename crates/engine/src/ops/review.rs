use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Session, Transaction, TransactionKind, TransactionStatus,
    transactions,
};

use super::{Engine, with_retry, with_tx};

impl Engine {
    async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        tx_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(tx_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// Flip a pending row to `status`, stamping the reviewer.
    ///
    /// The update only matches while the row is still `pending`, so of two
    /// racing reviewers exactly one wins; the other gets `AlreadyFinalized`.
    async fn finalize<C: ConnectionTrait>(
        &self,
        db: &C,
        tx: &mut Transaction,
        status: TransactionStatus,
        reviewer: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::Status, Expr::value(status.as_str()))
            .col_expr(transactions::Column::ReviewedBy, Expr::value(reviewer))
            .col_expr(transactions::Column::ReviewedAt, Expr::value(now))
            .filter(transactions::Column::Id.eq(tx.id.to_string()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::AlreadyFinalized(format!(
                "transaction {} is {}",
                tx.id,
                tx.status.as_str()
            )));
        }
        tx.status = status;
        tx.reviewed_by = Some(reviewer.to_string());
        tx.reviewed_at = Some(now);
        Ok(())
    }

    /// Load a transaction for review, checking its kind and that it is
    /// still pending.
    async fn pending_for_review<C: ConnectionTrait>(
        &self,
        db: &C,
        tx_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        let tx = self.require_transaction(db, tx_id).await?;
        if tx.kind != kind {
            return Err(EngineError::KeyNotFound(format!(
                "transaction {} is a {}, not a {}",
                tx.id,
                tx.kind.as_str(),
                kind.as_str()
            )));
        }
        if tx.status != TransactionStatus::Pending {
            return Err(EngineError::AlreadyFinalized(format!(
                "transaction {} is {}",
                tx.id,
                tx.status.as_str()
            )));
        }
        Ok(tx)
    }

    /// Approve (pay out) or reject a pending withdrawal.
    ///
    /// Funds left the balance when the withdrawal was requested, so approval
    /// only marks it `paid`. Rejection puts the amount back on the member.
    pub async fn handle_withdrawal(
        &self,
        session: &Session,
        tx_id: Uuid,
        approve: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let admin_id = session.require_admin()?;
        let tx = with_retry!(self, |db_tx| {
            let mut tx = self
                .pending_for_review(&db_tx, tx_id, TransactionKind::Withdrawal)
                .await?;
            if approve {
                self.finalize(&db_tx, &mut tx, TransactionStatus::Paid, admin_id, now)
                    .await?;
            } else {
                self.finalize(&db_tx, &mut tx, TransactionStatus::Rejected, admin_id, now)
                    .await?;
                let mut profile = self.require_profile(&db_tx, &tx.user_id).await?;
                self.restore_in(&db_tx, &mut profile, tx.amount).await?;
            }
            Ok(tx)
        })?;
        tracing::info!(
            admin_id,
            tx_id = %tx.id,
            user_id = %tx.user_id,
            amount = %tx.amount,
            status = tx.status.as_str(),
            "withdrawal reviewed"
        );
        Ok(tx)
    }

    /// Approve or reject a pending manual deposit. Approval credits the
    /// member; rejection leaves the balance alone.
    pub async fn handle_manual_deposit(
        &self,
        session: &Session,
        tx_id: Uuid,
        approve: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let admin_id = session.require_admin()?;
        let tx = with_retry!(self, |db_tx| {
            let mut tx = self
                .pending_for_review(&db_tx, tx_id, TransactionKind::ManualDeposit)
                .await?;
            if approve {
                self.finalize(&db_tx, &mut tx, TransactionStatus::Paid, admin_id, now)
                    .await?;
                let mut profile = self.require_profile(&db_tx, &tx.user_id).await?;
                self.restore_in(&db_tx, &mut profile, tx.amount).await?;
            } else {
                self.finalize(&db_tx, &mut tx, TransactionStatus::Rejected, admin_id, now)
                    .await?;
            }
            Ok(tx)
        })?;
        tracing::info!(
            admin_id,
            tx_id = %tx.id,
            user_id = %tx.user_id,
            amount = %tx.amount,
            status = tx.status.as_str(),
            "manual deposit reviewed"
        );
        Ok(tx)
    }

    /// Pending rows of `kind`, oldest first so the queue drains in order.
    /// Admin only.
    pub async fn pending_transactions(
        &self,
        session: &Session,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<Transaction>> {
        session.require_admin()?;
        transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}
