//! Investment primitives.
//!
//! An `Investment` is one member's purchase of a [`Product`]. The stored
//! status only ever moves `active -> completed`; whether an investment has
//! matured is derived from its dates on every read, so a row past its
//! `end_date` counts as completed even before a sweep rewrites it.
//!
//! [`Product`]: crate::Product

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, Product, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    Active,
    Completed,
}

impl InvestmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for InvestmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid investment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,
    pub user_id: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub amount: Money,
    pub daily_roi: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: InvestmentStatus,
}

impl Investment {
    /// Snapshot `product` into a new active investment starting at `now`.
    ///
    /// Fails with `InvalidInput` when the term would end past the
    /// representable calendar.
    pub fn start(user_id: String, product: &Product, now: DateTime<Utc>) -> ResultEngine<Self> {
        let end_date = now
            .checked_add_signed(Duration::days(i64::from(product.duration_days)))
            .ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "{} runs past the supported date range",
                    product.name
                ))
            })?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            product_id: product.id,
            product_name: product.name.clone(),
            amount: product.price,
            daily_roi: product.daily_roi,
            start_date: now,
            end_date,
            status: InvestmentStatus::Active,
        })
    }

    /// Status as observed at `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvestmentStatus {
        match self.status {
            InvestmentStatus::Completed => InvestmentStatus::Completed,
            InvestmentStatus::Active if now >= self.end_date => InvestmentStatus::Completed,
            InvestmentStatus::Active => InvestmentStatus::Active,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == InvestmentStatus::Active
    }
}

/// Advisory daily return: `amount × daily_roi / 100`, rounded to the kobo.
///
/// Nothing is posted to the ledger from this value.
pub fn compute_daily_earnings(investment: &Investment) -> Money {
    let kobo = investment.amount.kobo() as f64 * investment.daily_roi / 100.0;
    if !kobo.is_finite() || kobo <= 0.0 {
        return Money::ZERO;
    }
    Money::new(kobo.round() as i64)
}

/// Percentage of the investment term elapsed at `now`, in `[0, 100]`.
pub fn compute_progress(investment: &Investment, now: DateTime<Utc>) -> f64 {
    let total = (investment.end_date - investment.start_date).num_milliseconds();
    if total <= 0 {
        return if now >= investment.end_date { 100.0 } else { 0.0 };
    }
    let elapsed = (now - investment.start_date).num_milliseconds();
    (elapsed as f64 / total as f64).clamp(0.0, 1.0) * 100.0
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_name: String,
    pub amount: i64,
    pub daily_roi: f64,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Investment> for ActiveModel {
    fn from(investment: &Investment) -> Self {
        Self {
            id: ActiveValue::Set(investment.id.to_string()),
            user_id: ActiveValue::Set(investment.user_id.clone()),
            product_id: ActiveValue::Set(investment.product_id.to_string()),
            product_name: ActiveValue::Set(investment.product_name.clone()),
            amount: ActiveValue::Set(investment.amount.kobo()),
            daily_roi: ActiveValue::Set(investment.daily_roi),
            start_date: ActiveValue::Set(investment.start_date),
            end_date: ActiveValue::Set(investment.end_date),
            status: ActiveValue::Set(investment.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Investment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "investment")?,
            product_id: parse_uuid(&model.product_id, "product")?,
            status: InvestmentStatus::try_from(model.status.as_str())?,
            user_id: model.user_id,
            product_name: model.product_name,
            amount: Money::new(model.amount),
            daily_roi: model.daily_roi,
            start_date: model.start_date,
            end_date: model.end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn investment() -> Investment {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Investment {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            product_id: Uuid::new_v4(),
            product_name: "Starter Node".to_string(),
            amount: Money::new(5_000_000),
            daily_roi: 2.5,
            start_date: start,
            end_date: start + Duration::days(30),
            status: InvestmentStatus::Active,
        }
    }

    #[test]
    fn daily_earnings_is_a_percentage_of_amount() {
        assert_eq!(compute_daily_earnings(&investment()), Money::new(125_000));
    }

    #[test]
    fn progress_is_zero_before_start_and_saturates_at_end() {
        let inv = investment();
        assert_eq!(compute_progress(&inv, inv.start_date - Duration::days(1)), 0.0);
        assert_eq!(compute_progress(&inv, inv.start_date), 0.0);
        assert_eq!(compute_progress(&inv, inv.end_date), 100.0);
        assert_eq!(compute_progress(&inv, inv.end_date + Duration::days(9)), 100.0);
        let half = compute_progress(&inv, inv.start_date + Duration::days(15));
        assert!((half - 50.0).abs() < 1e-9);
    }

    #[test]
    fn progress_is_monotonic() {
        let inv = investment();
        let mut last = -1.0;
        for hour in (-48..(31 * 24)).step_by(7) {
            let p = compute_progress(&inv, inv.start_date + Duration::hours(hour));
            assert!(p >= last, "progress went backwards at hour {hour}");
            last = p;
        }
    }

    #[test]
    fn start_sets_the_end_date_from_the_product_term() {
        let inv = investment();
        let product = Product {
            id: inv.product_id,
            name: "Starter Node".to_string(),
            price: Money::new(5_000_000),
            daily_roi: 2.5,
            duration_days: 30,
            image_url: None,
            created_at: inv.start_date,
        };
        let started = Investment::start("alice".to_string(), &product, inv.start_date).unwrap();
        assert_eq!(started.end_date, inv.end_date);
        assert_eq!(started.amount, product.price);
    }

    #[test]
    fn start_rejects_terms_past_the_calendar() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Forever".to_string(),
            price: Money::new(100),
            daily_roi: 1.0,
            duration_days: i32::MAX,
            image_url: None,
            created_at: Utc::now(),
        };
        let err = Investment::start("alice".to_string(), &product, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn matured_investment_reads_as_completed() {
        let inv = investment();
        assert!(inv.is_active_at(inv.start_date + Duration::days(29)));
        assert_eq!(
            inv.effective_status(inv.end_date),
            InvestmentStatus::Completed
        );
    }
}
