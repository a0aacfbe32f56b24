//! Who is acting.
//!
//! A `Session` is opened by [`Engine::open_session`] once the identity
//! provider has authenticated a profile id, and is passed explicitly to every
//! engine operation.
//!
//! [`Engine::open_session`]: crate::Engine::open_session

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidInput(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Session {
    User { profile_id: String },
    Admin { profile_id: String },
}

impl Session {
    pub fn new(profile_id: impl Into<String>, role: Role) -> Self {
        let profile_id = profile_id.into();
        match role {
            Role::User => Self::User { profile_id },
            Role::Admin => Self::Admin { profile_id },
        }
    }

    pub fn profile_id(&self) -> &str {
        match self {
            Self::User { profile_id } | Self::Admin { profile_id } => profile_id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Admin { .. } => Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Fails with `Forbidden` unless this is an admin session.
    pub fn require_admin(&self) -> ResultEngine<&str> {
        match self {
            Self::Admin { profile_id } => Ok(profile_id),
            Self::User { .. } => Err(EngineError::Forbidden(
                "admin privileges required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_session_cannot_act_as_admin() {
        let session = Session::new("u-1", Role::User);
        assert_eq!(
            session.require_admin(),
            Err(EngineError::Forbidden("admin privileges required".to_string()))
        );
        assert_eq!(session.profile_id(), "u-1");
    }

    #[test]
    fn admin_session_exposes_its_id() {
        let session = Session::new("a-1", Role::Admin);
        assert_eq!(session.require_admin(), Ok("a-1"));
        assert_eq!(session.role(), Role::Admin);
    }
}
