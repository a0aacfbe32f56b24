use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, Investment, InvestmentStatus, Product, ResultEngine, Session, Transaction,
    TransactionKind, TransactionStatus, investments, products,
};

use super::{Engine, with_retry, with_tx};

impl Engine {
    pub(crate) async fn require_product<C: ConnectionTrait>(
        &self,
        db: &C,
        product_id: Uuid,
    ) -> ResultEngine<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        Product::try_from(model)
    }

    /// Investments still marked `active` in storage, newest first. Some may
    /// have matured already; callers filter with `effective_status`.
    async fn stored_active_investments<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Option<&str>,
    ) -> ResultEngine<Vec<Investment>> {
        let mut query = investments::Entity::find()
            .filter(investments::Column::Status.eq(InvestmentStatus::Active.as_str()));
        if let Some(user_id) = user_id {
            query = query.filter(investments::Column::UserId.eq(user_id.to_string()));
        }
        query
            .order_by_desc(investments::Column::StartDate)
            .all(db)
            .await?
            .into_iter()
            .map(Investment::try_from)
            .collect()
    }

    /// Buy a product with the session's own balance.
    ///
    /// A member holds at most one active investment. The debit, its
    /// `investment_purchase` ledger row and the new investment commit
    /// together or not at all.
    pub async fn purchase(
        &self,
        session: &Session,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Investment> {
        let investment = with_retry!(self, |db_tx| {
            let settings = self.load_settings(&db_tx).await?;
            let mut profile = self
                .require_member_writable(&db_tx, session, &settings)
                .await?;

            let running = self
                .stored_active_investments(&db_tx, Some(profile.id.as_str()))
                .await?;
            if running.iter().any(|inv| inv.is_active_at(now)) {
                return Err(EngineError::InvestmentLimitReached(
                    "an investment is already running".to_string(),
                ));
            }

            let product = self.require_product(&db_tx, product_id).await?;
            let investment = Investment::start(profile.id.clone(), &product, now)?;
            let tx = Transaction::new(
                profile.id.clone(),
                product.price,
                TransactionKind::InvestmentPurchase,
                TransactionStatus::Paid,
                format!("Purchased {}", product.name),
                now,
            )?;
            self.debit_in(&db_tx, &mut profile, &tx).await?;
            investments::ActiveModel::from(&investment)
                .insert(&db_tx)
                .await?;
            Ok(investment)
        })?;
        tracing::info!(
            user_id = %investment.user_id,
            product = %investment.product_name,
            amount = %investment.amount,
            "investment purchased"
        );
        Ok(investment)
    }

    /// Persist `completed` for every investment whose end date has passed.
    ///
    /// Reads already treat such investments as completed; the sweep only
    /// brings storage in line. Returns how many rows were flipped.
    pub async fn complete_matured_investments(
        &self,
        session: &Session,
        now: DateTime<Utc>,
    ) -> ResultEngine<u64> {
        session.require_admin()?;
        let completed = with_tx!(self, |db_tx| {
            let matured: Vec<Investment> = self
                .stored_active_investments(&db_tx, None)
                .await?
                .into_iter()
                .filter(|inv| !inv.is_active_at(now))
                .collect();

            let mut completed = 0;
            for investment in matured {
                let result = investments::Entity::update_many()
                    .col_expr(
                        investments::Column::Status,
                        Expr::value(InvestmentStatus::Completed.as_str()),
                    )
                    .filter(investments::Column::Id.eq(investment.id.to_string()))
                    .filter(investments::Column::Status.eq(InvestmentStatus::Active.as_str()))
                    .exec(&db_tx)
                    .await?;
                completed += result.rows_affected;
            }
            Ok(completed)
        })?;
        tracing::info!(completed, "matured investments completed");
        Ok(completed)
    }

    /// Every investment of `user_id`, newest first, with matured ones
    /// reported as completed.
    pub async fn investments(
        &self,
        session: &Session,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Investment>> {
        Self::require_owner_or_admin(session, user_id)?;
        investments::Entity::find()
            .filter(investments::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(investments::Column::StartDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| {
                let mut investment = Investment::try_from(model)?;
                investment.status = investment.effective_status(now);
                Ok(investment)
            })
            .collect()
    }

    /// The investment currently earning for `user_id`, if any.
    pub async fn active_investment(
        &self,
        session: &Session,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<Investment>> {
        Self::require_owner_or_admin(session, user_id)?;
        Ok(self
            .stored_active_investments(&self.database, Some(user_id))
            .await?
            .into_iter()
            .find(|inv| inv.is_active_at(now)))
    }

    /// Number of investments running at `now` across all members.
    pub(crate) async fn count_active_investments<C: ConnectionTrait>(
        &self,
        db: &C,
        now: DateTime<Utc>,
    ) -> ResultEngine<usize> {
        Ok(self
            .stored_active_investments(db, None)
            .await?
            .iter()
            .filter(|inv| inv.is_active_at(now))
            .count())
    }
}
