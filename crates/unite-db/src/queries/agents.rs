use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use unite_types::models::{Agent, Sector};

use super::OptionalExt;
use crate::Database;
use crate::models::{AGENT_COLUMNS, AgentRow};

impl Database {
    /// All agents, grouped by sector then name.
    pub fn list_agents(&self) -> Result<Vec<Agent>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM agents ORDER BY sector, name", AGENT_COLUMNS))?;
            let rows = stmt
                .query_map([], AgentRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(AgentRow::into_agent).collect()
        })
    }

    pub fn list_agents_by_sector(&self, sector: Sector) -> Result<Vec<Agent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM agents WHERE sector = ?1 ORDER BY name",
                AGENT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([sector.as_ref()], AgentRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(AgentRow::into_agent).collect()
        })
    }

    pub fn get_agent(&self, id: Uuid) -> Result<Option<Agent>> {
        self.with_conn(|conn| query_agent(conn, "id", &id.to_string()))
    }

    pub fn get_agent_by_slug(&self, slug: &str) -> Result<Option<Agent>> {
        self.with_conn(|conn| query_agent(conn, "slug", slug))
    }

    pub fn insert_agent(&self, agent: &Agent) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO agents (id, name, description, sector, slug, avatar) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    agent.id.to_string(),
                    agent.name,
                    agent.description,
                    agent.sector.as_ref(),
                    agent.slug,
                    agent.avatar,
                ],
            )?;
            Ok(())
        })
    }

    pub fn update_agent(&self, agent: &Agent) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE agents SET name = ?2, description = ?3, sector = ?4, slug = ?5, avatar = ?6 WHERE id = ?1",
                rusqlite::params![
                    agent.id.to_string(),
                    agent.name,
                    agent.description,
                    agent.sector.as_ref(),
                    agent.slug,
                    agent.avatar,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Fails with a foreign key error while conversations still reference the agent.
    pub fn delete_agent(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM agents WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }

    pub fn count_conversations_for_agent(&self, agent_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM conversations WHERE agent_id = ?1",
                [agent_id.to_string()],
                |r| r.get(0),
            )?;
            Ok(count as usize)
        })
    }
}

fn query_agent(conn: &Connection, column: &str, value: &str) -> Result<Option<Agent>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM agents WHERE {} = ?1", AGENT_COLUMNS, column))?;

    let row = stmt.query_row([value], AgentRow::from_row).optional()?;

    row.map(AgentRow::into_agent).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_is_seeded_four_per_sector() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.list_agents().unwrap().len(), 24);

        let tech = db.list_agents_by_sector(Sector::Tecnologia).unwrap();
        let names: Vec<&str> = tech.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Documentação", "Gerador de Testes", "Incidentes", "Suporte Técnico"]);
    }

    #[test]
    fn slug_lookup_and_update() {
        let db = Database::open_in_memory().unwrap();
        let mut agent = db.get_agent_by_slug("crm-helper").unwrap().unwrap();
        assert_eq!(agent.sector, Sector::Vendas);
        assert!(db.get_agent_by_slug("nope").unwrap().is_none());

        agent.description = "Relacionamento com clientes".into();
        agent.avatar = Some("crm.png".into());
        assert!(db.update_agent(&agent).unwrap());
        assert_eq!(db.get_agent(agent.id).unwrap().unwrap(), agent);
    }

    #[test]
    fn unreferenced_agent_can_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let agent = db.get_agent_by_slug("qualidade").unwrap().unwrap();
        assert_eq!(db.count_conversations_for_agent(agent.id).unwrap(), 0);
        assert!(db.delete_agent(agent.id).unwrap());
        assert!(db.get_agent_by_slug("qualidade").unwrap().is_none());
    }
}
