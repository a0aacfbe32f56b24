//! The investable node catalog.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Longest plan the catalog accepts, roughly a century.
pub const MAX_DURATION_DAYS: i32 = 36_500;

/// A product a member can buy into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    /// Daily return as a percentage of `price` (`2.5` means 2.5%).
    pub daily_roi: f64,
    pub duration_days: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: String,
        price: Money,
        daily_roi: f64,
        duration_days: i32,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if name.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "product name must not be empty".to_string(),
            ));
        }
        if !price.is_positive() {
            return Err(EngineError::InvalidAmount("price must be > 0".to_string()));
        }
        if !daily_roi.is_finite() || daily_roi < 0.0 {
            return Err(EngineError::InvalidAmount(
                "daily_roi must be a finite percentage >= 0".to_string(),
            ));
        }
        if duration_days <= 0 || duration_days > MAX_DURATION_DAYS {
            return Err(EngineError::InvalidAmount(format!(
                "duration_days must be between 1 and {MAX_DURATION_DAYS}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            price,
            daily_roi,
            duration_days,
            image_url,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub price: i64,
    pub daily_roi: f64,
    pub duration_days: i32,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        Self {
            id: ActiveValue::Set(product.id.to_string()),
            name: ActiveValue::Set(product.name.clone()),
            price: ActiveValue::Set(product.price.kobo()),
            daily_roi: ActiveValue::Set(product.daily_roi),
            duration_days: ActiveValue::Set(product.duration_days),
            image_url: ActiveValue::Set(product.image_url.clone()),
            created_at: ActiveValue::Set(product.created_at),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "product")?,
            name: model.name,
            price: Money::new(model.price),
            daily_roi: model.daily_roi,
            duration_days: model.duration_days,
            image_url: model.image_url,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_roi() {
        let err = Product::new(
            "Node".to_string(),
            Money::new(100),
            f64::NAN,
            30,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Product::new(
            "Node".to_string(),
            Money::new(100),
            2.0,
            0,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn rejects_terms_longer_than_a_century() {
        let err = Product::new(
            "Forever".to_string(),
            Money::new(100),
            1.0,
            1_000_000_000,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert!(
            Product::new(
                "Long".to_string(),
                Money::new(100),
                1.0,
                MAX_DURATION_DAYS,
                None,
                Utc::now(),
            )
            .is_ok()
        );
    }
}
