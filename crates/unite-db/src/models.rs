/// Database row types. These map directly to SQLite rows; conversion into
/// the unite-types models happens here so callers never see raw strings.
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use unite_types::models::{Agent, Message, User};

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub sector: String,
    pub created_at: String,
}

pub struct AgentRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub slug: String,
    pub avatar: Option<String>,
}

pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub agent_id: String,
    pub started_at: String,
    pub last_message_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sender_id: String,
    pub sender_kind: String,
    pub timestamp: String,
}

pub(crate) const USER_COLUMNS: &str = "id, name, email, role, sector, created_at";
pub(crate) const AGENT_COLUMNS: &str = "id, name, description, sector, slug, avatar";
pub(crate) const CONVERSATION_COLUMNS: &str = "id, user_id, agent_id, started_at, last_message_at";
pub(crate) const MESSAGE_COLUMNS: &str = "id, conversation_id, content, sender_id, sender_kind, timestamp";

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            sector: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id)?,
            role: self.role.parse().with_context(|| format!("bad role '{}' on user {}", self.role, self.id))?,
            sector: self
                .sector
                .parse()
                .with_context(|| format!("bad sector '{}' on user {}", self.sector, self.id))?,
            created_at: parse_timestamp(&self.created_at)?,
            name: self.name,
            email: self.email,
        })
    }
}

impl AgentRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            sector: row.get(3)?,
            slug: row.get(4)?,
            avatar: row.get(5)?,
        })
    }

    pub fn into_agent(self) -> Result<Agent> {
        Ok(Agent {
            id: parse_id(&self.id)?,
            sector: self
                .sector
                .parse()
                .with_context(|| format!("bad sector '{}' on agent {}", self.sector, self.id))?,
            name: self.name,
            description: self.description,
            slug: self.slug,
            avatar: self.avatar,
        })
    }
}

impl ConversationRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            agent_id: row.get(2)?,
            started_at: row.get(3)?,
            last_message_at: row.get(4)?,
        })
    }
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            content: row.get(2)?,
            sender_id: row.get(3)?,
            sender_kind: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }

    pub fn into_message(self) -> Result<Message> {
        Ok(Message {
            id: parse_id(&self.id)?,
            conversation_id: parse_id(&self.conversation_id)?,
            sender_id: parse_id(&self.sender_id)?,
            sender_kind: self
                .sender_kind
                .parse()
                .with_context(|| format!("bad sender_kind '{}' on message {}", self.sender_kind, self.id))?,
            timestamp: parse_timestamp(&self.timestamp)?,
            content: self.content,
        })
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().with_context(|| format!("corrupt id '{}'", raw))
}

/// Stored form: RFC 3339, millisecond precision, `Z` suffix. Sorts lexically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone. Treat it as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("corrupt timestamp '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_round_trip_at_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap()
            + chrono::Duration::milliseconds(42);
        let raw = format_timestamp(ts);
        assert_eq!(raw, "2026-03-01T12:30:05.042Z");
        assert_eq!(parse_timestamp(&raw).unwrap(), ts);
    }

    #[test]
    fn parses_sqlite_naive_datetime() {
        let ts = parse_timestamp("2026-03-01 12:30:05").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
