use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::seed;

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema + catalogue seed)");
        let tx = conn.transaction()?;
        tx.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                role        TEXT NOT NULL,
                sector      TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE agents (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                sector      TEXT NOT NULL,
                slug        TEXT NOT NULL UNIQUE,
                avatar      TEXT
            );

            CREATE INDEX idx_agents_sector ON agents(sector, name);

            CREATE TABLE conversations (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                agent_id        TEXT NOT NULL REFERENCES agents(id),
                started_at      TEXT NOT NULL,
                last_message_at TEXT NOT NULL
            );

            CREATE INDEX idx_conversations_user
                ON conversations(user_id, last_message_at);
            CREATE INDEX idx_conversations_agent
                ON conversations(agent_id);

            -- sender_id is a user or an agent id depending on sender_kind
            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                content         TEXT NOT NULL,
                sender_id       TEXT NOT NULL,
                sender_kind     TEXT NOT NULL CHECK (sender_kind IN ('user', 'agent')),
                timestamp       TEXT NOT NULL
            );

            CREATE INDEX idx_messages_conversation
                ON messages(conversation_id, timestamp);
            ",
        )?;
        seed::run(&tx)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap();

        let agents: i64 = conn
            .query_row("SELECT COUNT(*) FROM agents", [], |r| r.get(0))
            .unwrap();
        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(agents, 24);
        assert_eq!(versions, 1);
    }
}
