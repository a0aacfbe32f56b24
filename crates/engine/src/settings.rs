//! Process-wide settings singleton, stored as the row keyed `"global"`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Money;

pub(crate) const GLOBAL_KEY: &str = "global";

/// Bank account members pay into for manual deposits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAccount {
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub withdrawal_min: Money,
    /// Blocks every member write (purchases, withdrawals, deposits, coupons).
    pub maintenance_mode: bool,
    /// Blocks withdrawal requests only.
    pub withdrawals_paused: bool,
    pub deposit_account: DepositAccount,
    pub support_url: Option<String>,
    pub community_url: Option<String>,
    pub background_media_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// How often clients should re-fetch each screen, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingHints {
    pub admin_secs: u64,
    pub dashboard_secs: u64,
    pub chat_secs: u64,
}

impl Default for PollingHints {
    fn default() -> Self {
        Self {
            admin_secs: 10,
            dashboard_secs: 15,
            chat_secs: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub withdrawal_min: i64,
    pub maintenance_mode: bool,
    pub withdrawals_paused: bool,
    pub deposit_bank_name: Option<String>,
    pub deposit_account_number: Option<String>,
    pub deposit_account_name: Option<String>,
    pub support_url: Option<String>,
    pub community_url: Option<String>,
    pub background_media_url: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn global(settings: &GlobalSettings, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Set(GLOBAL_KEY.to_string()),
            withdrawal_min: ActiveValue::Set(settings.withdrawal_min.kobo()),
            maintenance_mode: ActiveValue::Set(settings.maintenance_mode),
            withdrawals_paused: ActiveValue::Set(settings.withdrawals_paused),
            deposit_bank_name: ActiveValue::Set(settings.deposit_account.bank_name.clone()),
            deposit_account_number: ActiveValue::Set(
                settings.deposit_account.account_number.clone(),
            ),
            deposit_account_name: ActiveValue::Set(
                settings.deposit_account.account_name.clone(),
            ),
            support_url: ActiveValue::Set(settings.support_url.clone()),
            community_url: ActiveValue::Set(settings.community_url.clone()),
            background_media_url: ActiveValue::Set(settings.background_media_url.clone()),
            updated_at: ActiveValue::Set(updated_at),
        }
    }
}

impl From<Model> for GlobalSettings {
    fn from(model: Model) -> Self {
        Self {
            withdrawal_min: Money::new(model.withdrawal_min),
            maintenance_mode: model.maintenance_mode,
            withdrawals_paused: model.withdrawals_paused,
            deposit_account: DepositAccount {
                bank_name: model.deposit_bank_name,
                account_number: model.deposit_account_number,
                account_name: model.deposit_account_name,
            },
            support_url: model.support_url,
            community_url: model.community_url,
            background_media_url: model.background_media_url,
            updated_at: Some(model.updated_at),
        }
    }
}
