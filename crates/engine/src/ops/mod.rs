use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};

use crate::{
    EngineError, GlobalSettings, Profile, ResultEngine, Transaction, profiles, settings,
    transactions,
};

mod access;
mod admin;
mod balances;
mod chat;
mod coupons;
mod global;
mod investments;
mod members;
mod review;

pub use admin::AdminOverview;
pub use members::{Dashboard, InvestmentView};

/// Attempts made for one operation before a profile version conflict is
/// reported to the caller.
pub(crate) const MAX_CONFLICT_ATTEMPTS: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Like `with_tx!`, but replays the whole block when a profile write loses a
/// version race. The block must only borrow its captures.
macro_rules! with_retry {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut attempt = 1;
        loop {
            let result: $crate::ResultEngine<_> = async { with_tx!($self, |$tx| $body) }.await;
            match result {
                Err($crate::EngineError::Conflict(reason))
                    if attempt < $crate::ops::MAX_CONFLICT_ATTEMPTS =>
                {
                    tracing::debug!(attempt, %reason, "profile version conflict, retrying");
                    attempt += 1;
                }
                other => break other,
            }
        }
    }};
}

pub(crate) use with_retry;
pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn find_profile<C: ConnectionTrait>(
        &self,
        db: &C,
        profile_id: &str,
    ) -> ResultEngine<Option<Profile>> {
        profiles::Entity::find_by_id(profile_id.to_string())
            .one(db)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    pub(crate) async fn require_profile<C: ConnectionTrait>(
        &self,
        db: &C,
        profile_id: &str,
    ) -> ResultEngine<Profile> {
        self.find_profile(db, profile_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("profile not exists".to_string()))
    }

    /// Persist `profile` only if nobody wrote it since it was read.
    ///
    /// On success `profile.version` is bumped in place; a stale version
    /// yields `Conflict` and writes nothing.
    pub(crate) async fn save_profile<C: ConnectionTrait>(
        &self,
        db: &C,
        profile: &mut Profile,
    ) -> ResultEngine<()> {
        let read_version = profile.version;
        let mut active = profiles::ActiveModel::try_from(&*profile)?;
        active.version = sea_orm::ActiveValue::Set(read_version + 1);

        let result = profiles::Entity::update_many()
            .set(active)
            .filter(profiles::Column::Id.eq(profile.id.clone()))
            .filter(profiles::Column::Version.eq(read_version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "profile {} changed since version {read_version}",
                profile.id
            )));
        }

        profile.version = read_version + 1;
        Ok(())
    }

    pub(crate) async fn insert_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db).await?;
        Ok(())
    }

    pub(crate) async fn load_settings<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<GlobalSettings> {
        Ok(settings::Entity::find_by_id(settings::GLOBAL_KEY.to_string())
            .one(db)
            .await?
            .map(GlobalSettings::from)
            .unwrap_or_default())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
