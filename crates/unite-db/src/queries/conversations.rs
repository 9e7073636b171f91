use anyhow::Result;
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use unite_types::models::{Conversation, Message, SenderKind};

use super::OptionalExt;
use crate::Database;
use crate::models::{
    CONVERSATION_COLUMNS, ConversationRow, MESSAGE_COLUMNS, MessageRow, format_timestamp, parse_id,
    parse_timestamp,
};

impl Database {
    // -- Conversations --

    pub fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, agent_id, started_at, last_message_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    conversation.id.to_string(),
                    conversation.user_id.to_string(),
                    conversation.agent_id.to_string(),
                    format_timestamp(conversation.started_at),
                    format_timestamp(conversation.last_message_at),
                ],
            )?;
            Ok(())
        })
    }

    /// Conversation with its messages, oldest first.
    pub fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM conversations WHERE id = ?1",
                CONVERSATION_COLUMNS
            ))?;
            let row = stmt.query_row([id.to_string()], ConversationRow::from_row).optional()?;

            match row {
                Some(row) => Ok(Some(load_conversation(conn, row)?)),
                None => Ok(None),
            }
        })
    }

    /// A user's conversations, most recently active first.
    pub fn list_conversations_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM conversations WHERE user_id = ?1 ORDER BY last_message_at DESC",
                CONVERSATION_COLUMNS
            ))?;
            let rows = stmt
                .query_map([user_id.to_string()], ConversationRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(|row| load_conversation(conn, row)).collect()
        })
    }

    // -- Messages --

    /// Insert a message and bump the parent's `last_message_at` in one transaction.
    ///
    /// The stored timestamp is `max(now, last_message_at)` so a conversation's
    /// messages never go backwards in time. Returns `None` when the
    /// conversation does not exist; nothing is written in that case.
    pub fn append_message(
        &self,
        conversation_id: Uuid,
        content: &str,
        sender_id: Uuid,
        sender_kind: SenderKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Message>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let cid = conversation_id.to_string();

            let last: Option<String> = tx
                .query_row(
                    "SELECT last_message_at FROM conversations WHERE id = ?1",
                    [&cid],
                    |r| r.get(0),
                )
                .optional()?;
            let Some(last) = last else {
                return Ok(None);
            };

            let message = Message {
                id: Uuid::new_v4(),
                conversation_id,
                content: content.to_string(),
                sender_id,
                sender_kind,
                timestamp: now.trunc_subsecs(3).max(parse_timestamp(&last)?),
            };
            let ts = format_timestamp(message.timestamp);

            tx.execute(
                "INSERT INTO messages (id, conversation_id, content, sender_id, sender_kind, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    message.id.to_string(),
                    &cid,
                    message.content,
                    message.sender_id.to_string(),
                    message.sender_kind.as_ref(),
                    &ts,
                ],
            )?;
            tx.execute(
                "UPDATE conversations SET last_message_at = ?2 WHERE id = ?1",
                (&cid, &ts),
            )?;
            tx.commit()?;

            Ok(Some(message))
        })
    }

    #[cfg(test)]
    pub(crate) fn get_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.with_conn(|conn| query_messages(conn, &conversation_id.to_string()))
    }
}

fn load_conversation(conn: &Connection, row: ConversationRow) -> Result<Conversation> {
    let messages = query_messages(conn, &row.id)?;
    Ok(Conversation {
        id: parse_id(&row.id)?,
        user_id: parse_id(&row.user_id)?,
        agent_id: parse_id(&row.agent_id)?,
        messages,
        started_at: parse_timestamp(&row.started_at)?,
        last_message_at: parse_timestamp(&row.last_message_at)?,
    })
}

fn query_messages(conn: &Connection, conversation_id: &str) -> Result<Vec<Message>> {
    // rowid breaks ties between messages stamped in the same millisecond
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages WHERE conversation_id = ?1 ORDER BY timestamp ASC, rowid ASC",
        MESSAGE_COLUMNS
    ))?;

    let rows = stmt
        .query_map([conversation_id], MessageRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(MessageRow::into_message).collect()
}
