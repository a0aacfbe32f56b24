//! Member/support chat threads. One thread per member, keyed by `user_id`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Role, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    /// Owner of the thread (always a member, even for admin replies).
    pub user_id: String,
    pub sender: Role,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub sender: String,
    pub body: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ChatMessage> for ActiveModel {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: ActiveValue::Set(message.id.to_string()),
            user_id: ActiveValue::Set(message.user_id.clone()),
            sender: ActiveValue::Set(message.sender.as_str().to_string()),
            body: ActiveValue::Set(message.body.clone()),
            created_at: ActiveValue::Set(message.created_at),
        }
    }
}

impl TryFrom<Model> for ChatMessage {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "chat message")?,
            sender: Role::try_from(model.sender.as_str())?,
            user_id: model.user_id,
            body: model.body,
            created_at: model.created_at,
        })
    }
}
