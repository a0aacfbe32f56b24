use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, TransactionTrait, sea_query::OnConflict};

use crate::{EngineError, GlobalSettings, ResultEngine, Session, settings};

use super::{Engine, with_tx};

impl Engine {
    /// The global settings row, or defaults before an admin first saves one.
    pub async fn settings(&self) -> ResultEngine<GlobalSettings> {
        self.load_settings(&self.database).await
    }

    /// Replace the global settings. Admin only.
    pub async fn update_settings(
        &self,
        session: &Session,
        new_settings: &GlobalSettings,
        now: DateTime<Utc>,
    ) -> ResultEngine<GlobalSettings> {
        let admin_id = session.require_admin()?;
        if new_settings.withdrawal_min.kobo() < 0 {
            return Err(EngineError::InvalidAmount(
                "withdrawal minimum must be >= 0".to_string(),
            ));
        }

        let saved = with_tx!(self, |db_tx| {
            settings::Entity::insert(settings::ActiveModel::global(new_settings, now))
                .on_conflict(
                    OnConflict::column(settings::Column::Id)
                        .update_columns([
                            settings::Column::WithdrawalMin,
                            settings::Column::MaintenanceMode,
                            settings::Column::WithdrawalsPaused,
                            settings::Column::DepositBankName,
                            settings::Column::DepositAccountNumber,
                            settings::Column::DepositAccountName,
                            settings::Column::SupportUrl,
                            settings::Column::CommunityUrl,
                            settings::Column::BackgroundMediaUrl,
                            settings::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&db_tx)
                .await?;
            self.load_settings(&db_tx).await
        })?;
        tracing::info!(
            admin_id,
            maintenance = saved.maintenance_mode,
            withdrawals_paused = saved.withdrawals_paused,
            withdrawal_min = %saved.withdrawal_min,
            "settings updated"
        );
        Ok(saved)
    }
}
