//! Admin-issued credit codes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    /// Always stored upper-case.
    pub code: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: &str, amount: Money, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        let code = normalize_code(code)?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "coupon amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            amount,
            created_at,
        })
    }
}

/// Canonical form used for storage and lookup.
pub(crate) fn normalize_code(code: &str) -> ResultEngine<String> {
    let code = code.trim();
    if code.is_empty() || code.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidCode(format!("{code:?}")));
    }
    Ok(code.to_uppercase())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Coupon> for ActiveModel {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: ActiveValue::Set(coupon.id.to_string()),
            code: ActiveValue::Set(coupon.code.clone()),
            amount: ActiveValue::Set(coupon.amount.kobo()),
            created_at: ActiveValue::Set(coupon.created_at),
        }
    }
}

impl TryFrom<Model> for Coupon {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "coupon")?,
            code: model.code,
            amount: Money::new(model.amount),
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(normalize_code(" welcome50 ").unwrap(), "WELCOME50");
        assert!(normalize_code("   ").is_err());
        assert!(normalize_code("TWO WORDS").is_err());
    }
}
