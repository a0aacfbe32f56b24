use sea_orm::ConnectionTrait;

use crate::{EngineError, GlobalSettings, Profile, ResultEngine, Session};

use super::Engine;

impl Engine {
    /// Open a session for an authenticated profile.
    ///
    /// Frozen accounts cannot sign in. The role is read from the stored
    /// profile, never from the caller.
    pub async fn open_session(&self, profile_id: &str) -> ResultEngine<Session> {
        let profile = self.require_profile(&self.database, profile_id).await?;
        if profile.is_frozen {
            return Err(EngineError::AccountFrozen(
                "account is frozen, contact support".to_string(),
            ));
        }
        tracing::debug!(profile_id, role = profile.role.as_str(), "session opened");
        Ok(Session::new(profile.id, profile.role))
    }

    /// Load the session's own profile for a member-initiated write.
    ///
    /// Frozen accounts are rejected here too, so a session opened before a
    /// freeze cannot keep moving money. Admins are exempt from maintenance.
    pub(super) async fn require_member_writable<C: ConnectionTrait>(
        &self,
        db: &C,
        session: &Session,
        settings: &GlobalSettings,
    ) -> ResultEngine<Profile> {
        if settings.maintenance_mode && !session.is_admin() {
            return Err(EngineError::MaintenanceLocked(
                "maintenance in progress".to_string(),
            ));
        }
        let profile = self.require_profile(db, session.profile_id()).await?;
        if profile.is_frozen {
            return Err(EngineError::AccountFrozen("account is frozen".to_string()));
        }
        Ok(profile)
    }

    /// Members may only read their own records; admins may read anyone's.
    pub(super) fn require_owner_or_admin(session: &Session, user_id: &str) -> ResultEngine<()> {
        if session.is_admin() || session.profile_id() == user_id {
            return Ok(());
        }
        Err(EngineError::Forbidden(
            "records belong to another profile".to_string(),
        ))
    }
}
