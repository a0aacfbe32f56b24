use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    EngineError, Money, Profile, ResultEngine, Session, Transaction, TransactionKind,
    TransactionStatus,
    commands::{AdjustDirection, LedgerCmd},
};

use super::{Engine, with_retry, with_tx};

impl Engine {
    /// Add `tx.amount` to the profile and record `tx` in the same store
    /// transaction. `profile` must have been read through `db`.
    pub(crate) async fn credit_in<C: ConnectionTrait>(
        &self,
        db: &C,
        profile: &mut Profile,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        profile.balance = profile
            .balance
            .checked_add(tx.amount)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        self.save_profile(db, profile).await?;
        self.insert_transaction(db, tx).await
    }

    /// Subtract `tx.amount` from the profile and record `tx`.
    ///
    /// Fails with `InsufficientFunds` before anything is written when the
    /// balance cannot cover the amount.
    pub(crate) async fn debit_in<C: ConnectionTrait>(
        &self,
        db: &C,
        profile: &mut Profile,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        if profile.balance < tx.amount {
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} is below {}",
                profile.balance, tx.amount
            )));
        }
        profile.balance -= tx.amount;
        self.save_profile(db, profile).await?;
        self.insert_transaction(db, tx).await
    }

    /// Put `amount` back on the profile without a ledger row of its own; the
    /// caller's finalized transaction documents the movement.
    pub(crate) async fn restore_in<C: ConnectionTrait>(
        &self,
        db: &C,
        profile: &mut Profile,
        amount: Money,
    ) -> ResultEngine<()> {
        profile.balance = profile
            .balance
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        self.save_profile(db, profile).await
    }

    fn ledger_entry(cmd: &LedgerCmd) -> ResultEngine<Transaction> {
        Transaction::new(
            cmd.user_id.clone(),
            cmd.amount,
            cmd.kind,
            cmd.status,
            cmd.description.clone(),
            cmd.occurred_at,
        )
    }

    /// Credit a profile and log the entry. Admin only.
    pub async fn credit(&self, session: &Session, cmd: LedgerCmd) -> ResultEngine<Transaction> {
        let admin_id = session.require_admin()?;
        let tx = with_retry!(self, |db_tx| {
            let mut profile = self.require_profile(&db_tx, &cmd.user_id).await?;
            let tx = Self::ledger_entry(&cmd)?;
            self.credit_in(&db_tx, &mut profile, &tx).await?;
            Ok(tx)
        })?;
        tracing::info!(admin_id, user_id = %tx.user_id, amount = %tx.amount, "credit posted");
        Ok(tx)
    }

    /// Debit a profile and log the entry. Admin only.
    pub async fn debit(&self, session: &Session, cmd: LedgerCmd) -> ResultEngine<Transaction> {
        let admin_id = session.require_admin()?;
        let tx = with_retry!(self, |db_tx| {
            let mut profile = self.require_profile(&db_tx, &cmd.user_id).await?;
            let tx = Self::ledger_entry(&cmd)?;
            self.debit_in(&db_tx, &mut profile, &tx).await?;
            Ok(tx)
        })?;
        tracing::info!(admin_id, user_id = %tx.user_id, amount = %tx.amount, "debit posted");
        Ok(tx)
    }

    /// Manually move a member's balance.
    ///
    /// Subtractions clamp at zero instead of failing: the ledger row records
    /// what was actually removed and its description notes the requested
    /// figure. Subtracting from an empty balance fails with
    /// `InsufficientFunds` and writes nothing.
    pub async fn adjust_by_admin(
        &self,
        session: &Session,
        user_id: &str,
        amount: Money,
        direction: AdjustDirection,
        now: DateTime<Utc>,
    ) -> ResultEngine<Profile> {
        let admin_id = session.require_admin()?;
        let profile = with_retry!(self, |db_tx| {
            let mut profile = self.require_profile(&db_tx, user_id).await?;
            let tx = match direction {
                AdjustDirection::Add => {
                    let tx = Transaction::new(
                        user_id.to_string(),
                        amount,
                        TransactionKind::Deposit,
                        TransactionStatus::Paid,
                        "Admin adjustment".to_string(),
                        now,
                    )?;
                    profile.balance = profile.balance.checked_add(amount).ok_or_else(|| {
                        EngineError::InvalidAmount("balance overflow".to_string())
                    })?;
                    tx
                }
                AdjustDirection::Subtract => {
                    if !profile.balance.is_positive() {
                        return Err(EngineError::InsufficientFunds(
                            "balance is already zero".to_string(),
                        ));
                    }
                    let removed = amount.min(profile.balance);
                    let description = if removed < amount {
                        format!("Admin adjustment (requested {amount}, clamped to {removed})")
                    } else {
                        "Admin adjustment".to_string()
                    };
                    let tx = Transaction::new(
                        user_id.to_string(),
                        removed,
                        TransactionKind::Withdrawal,
                        TransactionStatus::Paid,
                        description,
                        now,
                    )?;
                    profile.balance = profile.balance.saturating_floor_sub(removed);
                    tx
                }
            };
            self.save_profile(&db_tx, &mut profile).await?;
            self.insert_transaction(&db_tx, &tx).await?;
            Ok(profile)
        })?;
        tracing::info!(
            admin_id,
            user_id,
            ?direction,
            %amount,
            balance = %profile.balance,
            "balance adjusted by admin"
        );
        Ok(profile)
    }

    /// Current balance of a profile.
    pub async fn balance(&self, session: &Session, user_id: &str) -> ResultEngine<Money> {
        Self::require_owner_or_admin(session, user_id)?;
        Ok(self.require_profile(&self.database, user_id).await?.balance)
    }

    /// Re-read a profile inside a fresh transaction; used by callers that need
    /// a consistent snapshot of balance and flags together.
    pub async fn profile(&self, session: &Session, user_id: &str) -> ResultEngine<Profile> {
        Self::require_owner_or_admin(session, user_id)?;
        with_tx!(self, |db_tx| self.require_profile(&db_tx, user_id).await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter, sea_query::Expr};

    use super::*;
    use crate::{Role, ops::MAX_CONFLICT_ATTEMPTS, profiles};

    async fn engine_with_member() -> (Engine, Profile) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        let profile = Profile::new(
            "u1".to_string(),
            "u1@example.com".to_string(),
            "CODE0001".to_string(),
            None,
            Utc::now(),
        );
        profiles::Entity::insert(profiles::ActiveModel::try_from(&profile).unwrap())
            .exec(&engine.database)
            .await
            .unwrap();
        (engine, profile)
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let (engine, profile) = engine_with_member().await;

        let mut fresh = profile.clone();
        fresh.balance = Money::new(100);
        engine.save_profile(&engine.database, &mut fresh).await.unwrap();
        assert_eq!(fresh.version, profile.version + 1);

        let mut stale = profile;
        stale.balance = Money::new(999);
        let err = engine
            .save_profile(&engine.database, &mut stale)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        let admin = Session::new("root", Role::Admin);
        assert_eq!(engine.balance(&admin, "u1").await.unwrap(), Money::new(100));
    }

    /// Credit `u1` by 100 under `with_retry!`, letting another writer bump the
    /// profile version between the read and the save on the first
    /// `racing_attempts` attempts. Returns the outcome and the attempt count.
    async fn credit_racing(engine: &Engine, racing_attempts: u32) -> (ResultEngine<Money>, u32) {
        let attempts = AtomicU32::new(0);
        let result = with_retry!(engine, |db_tx| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let mut profile = engine.require_profile(&db_tx, "u1").await?;
            if attempt <= racing_attempts {
                profiles::Entity::update_many()
                    .col_expr(
                        profiles::Column::Version,
                        Expr::col(profiles::Column::Version).add(1),
                    )
                    .filter(profiles::Column::Id.eq("u1"))
                    .exec(&db_tx)
                    .await?;
            }
            profile.balance = profile.balance + Money::new(100);
            engine.save_profile(&db_tx, &mut profile).await?;
            Ok(profile.balance)
        });
        (result, attempts.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn lost_version_race_is_replayed() {
        let (engine, _) = engine_with_member().await;

        let (result, attempts) = credit_racing(&engine, 1).await;
        assert_eq!(result.unwrap(), Money::new(100));
        assert_eq!(attempts, 2);

        let admin = Session::new("root", Role::Admin);
        assert_eq!(engine.balance(&admin, "u1").await.unwrap(), Money::new(100));
    }

    #[tokio::test]
    async fn persistent_conflict_gives_up_after_max_attempts() {
        let (engine, _) = engine_with_member().await;

        let (result, attempts) = credit_racing(&engine, u32::MAX).await;
        assert!(matches!(result, Err(EngineError::Conflict(_))));
        assert_eq!(attempts, MAX_CONFLICT_ATTEMPTS);

        let admin = Session::new("root", Role::Admin);
        assert_eq!(engine.balance(&admin, "u1").await.unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn failed_debit_leaves_no_trace() {
        let (engine, _) = engine_with_member().await;
        let admin = Session::new("root", Role::Admin);
        let cmd = LedgerCmd::new("u1", Money::new(500), TransactionKind::Withdrawal, Utc::now());

        let err = engine.debit(&admin, cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds(_)));
        assert!(engine.transactions_for(&admin, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn members_cannot_post_credits() {
        let (engine, _) = engine_with_member().await;
        let member = Session::new("u1", Role::User);
        let cmd = LedgerCmd::new("u1", Money::new(500), TransactionKind::Deposit, Utc::now());
        assert!(matches!(
            engine.credit(&member, cmd).await,
            Err(EngineError::Forbidden(_))
        ));
    }
}
