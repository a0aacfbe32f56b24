//! Member profiles.
//!
//! A profile owns its balance and the set of coupons it has redeemed. Every
//! write bumps `version`, which the engine uses as a compare-and-swap guard.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, Role, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub balance: Money,
    pub is_frozen: bool,
    pub is_restricted: bool,
    pub warning_message: Option<String>,
    pub used_coupons: BTreeSet<Uuid>,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        id: String,
        email: String,
        referral_code: String,
        referred_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role: Role::User,
            balance: Money::ZERO,
            is_frozen: false,
            is_restricted: false,
            warning_message: None,
            used_coupons: BTreeSet::new(),
            referral_code,
            referred_by,
            version: 0,
            created_at,
        }
    }

    pub fn has_redeemed(&self, coupon_id: Uuid) -> bool {
        self.used_coupons.contains(&coupon_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub role: String,
    pub balance: i64,
    pub is_frozen: bool,
    pub is_restricted: bool,
    pub warning_message: Option<String>,
    /// JSON array of coupon ids.
    pub used_coupons: String,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub version: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn encode_used_coupons(used: &BTreeSet<Uuid>) -> ResultEngine<String> {
    serde_json::to_string(used)
        .map_err(|err| EngineError::InvalidInput(format!("invalid used_coupons: {err}")))
}

fn decode_used_coupons(raw: &str) -> ResultEngine<BTreeSet<Uuid>> {
    if raw.trim().is_empty() {
        return Ok(BTreeSet::new());
    }
    let ids: Vec<String> = serde_json::from_str(raw)
        .map_err(|err| EngineError::InvalidInput(format!("invalid used_coupons: {err}")))?;
    ids.iter().map(|id| parse_uuid(id, "coupon")).collect()
}

impl TryFrom<&Profile> for ActiveModel {
    type Error = EngineError;

    fn try_from(profile: &Profile) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(profile.id.clone()),
            email: ActiveValue::Set(profile.email.clone()),
            role: ActiveValue::Set(profile.role.as_str().to_string()),
            balance: ActiveValue::Set(profile.balance.kobo()),
            is_frozen: ActiveValue::Set(profile.is_frozen),
            is_restricted: ActiveValue::Set(profile.is_restricted),
            warning_message: ActiveValue::Set(profile.warning_message.clone()),
            used_coupons: ActiveValue::Set(encode_used_coupons(&profile.used_coupons)?),
            referral_code: ActiveValue::Set(profile.referral_code.clone()),
            referred_by: ActiveValue::Set(profile.referred_by.clone()),
            version: ActiveValue::Set(profile.version),
            created_at: ActiveValue::Set(profile.created_at),
        })
    }
}

impl TryFrom<Model> for Profile {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::try_from(model.role.as_str())?,
            used_coupons: decode_used_coupons(&model.used_coupons)?,
            id: model.id,
            email: model.email,
            balance: Money::new(model.balance),
            is_frozen: model.is_frozen,
            is_restricted: model.is_restricted,
            warning_message: model.warning_message,
            referral_code: model.referral_code,
            referred_by: model.referred_by,
            version: model.version,
            created_at: model.created_at,
        })
    }
}
