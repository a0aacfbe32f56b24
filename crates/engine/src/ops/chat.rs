use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ChatMessage, ResultEngine, Session, chat, util::normalize_required_text};

use super::{Engine, with_tx};

impl Engine {
    /// Post to a support thread.
    ///
    /// Members may only post to their own thread; admins reply in any thread.
    pub async fn send_message(
        &self,
        session: &Session,
        thread_user_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<ChatMessage> {
        Self::require_owner_or_admin(session, thread_user_id)?;
        let body = normalize_required_text(body, "message body")?;
        let message = ChatMessage {
            id: Uuid::new_v4(),
            user_id: thread_user_id.to_string(),
            sender: session.role(),
            body,
            created_at: now,
        };
        with_tx!(self, |db_tx| {
            // Threads belong to existing profiles only.
            self.require_profile(&db_tx, thread_user_id).await?;
            chat::ActiveModel::from(&message).insert(&db_tx).await?;
            Ok(())
        })?;
        tracing::debug!(
            thread = thread_user_id,
            sender = message.sender.as_str(),
            "chat message sent"
        );
        Ok(message)
    }

    /// A thread in chronological order, optionally only messages after `since`.
    pub async fn messages(
        &self,
        session: &Session,
        thread_user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<ChatMessage>> {
        Self::require_owner_or_admin(session, thread_user_id)?;
        let mut query =
            chat::Entity::find().filter(chat::Column::UserId.eq(thread_user_id.to_string()));
        if let Some(since) = since {
            query = query.filter(chat::Column::CreatedAt.gt(since));
        }
        query
            .order_by_asc(chat::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ChatMessage::try_from)
            .collect()
    }

    /// The latest message of every thread, most recently active first. Admin only.
    pub async fn chat_threads(&self, session: &Session) -> ResultEngine<Vec<ChatMessage>> {
        session.require_admin()?;
        let models = chat::Entity::find()
            .order_by_desc(chat::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut seen = HashSet::new();
        models
            .into_iter()
            .filter(|model| seen.insert(model.user_id.clone()))
            .map(ChatMessage::try_from)
            .collect()
    }
}
