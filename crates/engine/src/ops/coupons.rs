use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Coupon, EngineError, Money, ResultEngine, Session, Transaction, TransactionKind,
    TransactionStatus, coupons, coupons::normalize_code,
};

use super::{Engine, with_retry, with_tx};

impl Engine {
    /// Redeem a coupon code for the session's profile.
    ///
    /// Codes match case-insensitively. Each profile redeems a given coupon at
    /// most once; the credit, the used-coupon mark and the `deposit` ledger
    /// row land in one profile write.
    pub async fn redeem(
        &self,
        session: &Session,
        code: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Money> {
        let code = normalize_code(code)?;
        let coupon = with_retry!(self, |db_tx| {
            let settings = self.load_settings(&db_tx).await?;
            let mut profile = self
                .require_member_writable(&db_tx, session, &settings)
                .await?;

            let coupon = coupons::Entity::find()
                .filter(coupons::Column::Code.eq(code.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::InvalidCode(code.clone()))?;
            let coupon = Coupon::try_from(coupon)?;
            if profile.has_redeemed(coupon.id) {
                return Err(EngineError::AlreadyRedeemed(coupon.code));
            }

            let tx = Transaction::new(
                profile.id.clone(),
                coupon.amount,
                TransactionKind::Deposit,
                TransactionStatus::Paid,
                format!("Coupon {}", coupon.code),
                now,
            )?;
            profile.used_coupons.insert(coupon.id);
            self.credit_in(&db_tx, &mut profile, &tx).await?;
            Ok(coupon)
        })?;
        tracing::info!(
            user_id = session.profile_id(),
            code = %coupon.code,
            amount = %coupon.amount,
            "coupon redeemed"
        );
        Ok(coupon.amount)
    }

    /// Issue a new coupon. Admin only; codes are unique ignoring case.
    pub async fn create_coupon(
        &self,
        session: &Session,
        code: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<Coupon> {
        session.require_admin()?;
        let coupon = Coupon::new(code, amount, now)?;
        with_tx!(self, |db_tx| {
            let exists = coupons::Entity::find()
                .filter(coupons::Column::Code.eq(coupon.code.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(coupon.code.clone()));
            }
            coupons::ActiveModel::from(&coupon).insert(&db_tx).await?;
            Ok(())
        })?;
        tracing::info!(code = %coupon.code, amount = %coupon.amount, "coupon created");
        Ok(coupon)
    }

    /// All coupons, newest first. Admin only.
    pub async fn coupons(&self, session: &Session) -> ResultEngine<Vec<Coupon>> {
        session.require_admin()?;
        coupons::Entity::find()
            .order_by_desc(coupons::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Coupon::try_from)
            .collect()
    }
}
