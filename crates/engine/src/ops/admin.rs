use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::Serialize;

use crate::{
    EngineError, Money, Product, Profile, ResultEngine, Role, Session, TransactionKind, TransactionStatus,
    commands::ProductCmd, products, profiles, transactions, util::normalize_optional_text,
};

use super::{Engine, with_retry, with_tx};

/// Headline figures for the admin console.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    pub user_count: u64,
    pub total_balance: Money,
    pub pending_withdrawals: Money,
    pub pending_manual_deposits: Money,
    pub active_investments: usize,
}

fn total(amounts: Vec<Money>, label: &str) -> ResultEngine<Money> {
    Money::checked_sum(amounts)
        .ok_or_else(|| EngineError::InvalidAmount(format!("{label} total overflows")))
}

impl Engine {
    /// Apply `change` to a profile's moderation fields under the version check.
    async fn moderate<F>(
        &self,
        session: &Session,
        user_id: &str,
        change: F,
    ) -> ResultEngine<Profile>
    where
        F: Fn(&mut Profile),
    {
        let admin_id = session.require_admin()?;
        let profile = with_retry!(self, |db_tx| {
            let mut profile = self.require_profile(&db_tx, user_id).await?;
            change(&mut profile);
            self.save_profile(&db_tx, &mut profile).await?;
            Ok(profile)
        })?;
        tracing::info!(
            admin_id,
            user_id,
            frozen = profile.is_frozen,
            restricted = profile.is_restricted,
            warned = profile.warning_message.is_some(),
            "profile moderated"
        );
        Ok(profile)
    }

    /// Flip the frozen flag. Frozen members cannot sign in or move money.
    pub async fn toggle_freeze(&self, session: &Session, user_id: &str) -> ResultEngine<bool> {
        let profile = self
            .moderate(session, user_id, |profile| {
                profile.is_frozen = !profile.is_frozen;
            })
            .await?;
        Ok(profile.is_frozen)
    }

    /// Block or allow withdrawals for a member.
    pub async fn set_restricted(
        &self,
        session: &Session,
        user_id: &str,
        restricted: bool,
    ) -> ResultEngine<Profile> {
        self.moderate(session, user_id, |profile| {
            profile.is_restricted = restricted;
        })
        .await
    }

    /// Show (or clear, with `None` or blank text) a banner on the member's dashboard.
    pub async fn set_warning_message(
        &self,
        session: &Session,
        user_id: &str,
        message: Option<&str>,
    ) -> ResultEngine<Profile> {
        let message = normalize_optional_text(message);
        self.moderate(session, user_id, |profile| {
            profile.warning_message = message.clone();
        })
        .await
    }

    /// Grant the admin role without a session. Only for local bootstrap
    /// tooling that already has direct store access.
    pub async fn promote_to_admin(&self, user_id: &str) -> ResultEngine<Profile> {
        let profile = with_retry!(self, |db_tx| {
            let mut profile = self.require_profile(&db_tx, user_id).await?;
            profile.role = Role::Admin;
            self.save_profile(&db_tx, &mut profile).await?;
            Ok(profile)
        })?;
        tracing::warn!(user_id, "profile promoted to admin");
        Ok(profile)
    }

    /// All profiles, newest first. Admin only.
    pub async fn profiles(&self, session: &Session) -> ResultEngine<Vec<Profile>> {
        session.require_admin()?;
        profiles::Entity::find()
            .order_by_desc(profiles::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Profile::try_from)
            .collect()
    }

    async fn pending_total<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: TransactionKind,
    ) -> ResultEngine<Money> {
        let amounts = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .all(db)
            .await?
            .iter()
            .map(|model| Money::new(model.amount))
            .collect::<Vec<_>>();
        total(amounts, kind.as_str())
    }

    /// Console headline figures, read in one snapshot. Admin only.
    pub async fn overview(
        &self,
        session: &Session,
        now: DateTime<Utc>,
    ) -> ResultEngine<AdminOverview> {
        session.require_admin()?;
        with_tx!(self, |db_tx| {
            let balances = profiles::Entity::find()
                .all(&db_tx)
                .await?
                .iter()
                .map(|model| Money::new(model.balance))
                .collect::<Vec<_>>();
            Ok(AdminOverview {
                user_count: profiles::Entity::find().count(&db_tx).await?,
                total_balance: total(balances, "balance")?,
                pending_withdrawals: self
                    .pending_total(&db_tx, TransactionKind::Withdrawal)
                    .await?,
                pending_manual_deposits: self
                    .pending_total(&db_tx, TransactionKind::ManualDeposit)
                    .await?,
                active_investments: self.count_active_investments(&db_tx, now).await?,
            })
        })
    }

    /// Add a product to the catalog. Admin only.
    pub async fn create_product(
        &self,
        session: &Session,
        cmd: ProductCmd,
        now: DateTime<Utc>,
    ) -> ResultEngine<Product> {
        session.require_admin()?;
        let product = Product::new(
            cmd.name,
            cmd.price,
            cmd.daily_roi,
            cmd.duration_days,
            normalize_optional_text(cmd.image_url.as_deref()),
            now,
        )?;
        with_tx!(self, |db_tx| {
            products::ActiveModel::from(&product).insert(&db_tx).await?;
            Ok(())
        })?;
        tracing::info!(product = %product.name, price = %product.price, "product created");
        Ok(product)
    }

    /// The product catalog, cheapest first.
    pub async fn products(&self) -> ResultEngine<Vec<Product>> {
        products::Entity::find()
            .order_by_asc(products::Column::Price)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }
}
