use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// Current time at the millisecond precision the store keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Business-domain category that scopes agents and users.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum Sector {
    #[serde(rename = "Marketing")]
    #[strum(serialize = "Marketing")]
    Marketing,
    #[serde(rename = "Financeiro")]
    #[strum(serialize = "Financeiro")]
    Financeiro,
    #[serde(rename = "Recursos Humanos")]
    #[strum(serialize = "Recursos Humanos")]
    RecursosHumanos,
    #[serde(rename = "Operações")]
    #[strum(serialize = "Operações")]
    Operacoes,
    #[serde(rename = "Vendas")]
    #[strum(serialize = "Vendas")]
    Vendas,
    #[serde(rename = "Tecnologia")]
    #[strum(serialize = "Tecnologia")]
    Tecnologia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum UserRole {
    #[serde(rename = "USUARIO_COMUM")]
    #[strum(serialize = "USUARIO_COMUM")]
    User,
    #[serde(rename = "ADMINISTRADOR")]
    #[strum(serialize = "ADMINISTRADOR")]
    Admin,
    #[serde(rename = "ADMINISTRADOR_GERAL")]
    #[strum(serialize = "ADMINISTRADOR_GERAL")]
    SuperAdmin,
}

/// Whether a message came from the human user or from the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SenderKind {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub sector: Sector,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sector: Sector,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Agent {
    /// Chat page for this agent, pinned to an existing conversation.
    pub fn chat_url(&self, conversation_id: Uuid) -> String {
        format!("/chat/{}?conversation={}", self.slug, conversation_id)
    }

    pub fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub sender_kind: SenderKind,
    pub timestamp: DateTime<Utc>,
}

/// A thread between one user and one agent. `messages` is ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub messages: Vec<Message>,
    pub started_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: Uuid, agent_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            agent_id,
            messages: Vec::new(),
            started_at: now,
            last_message_at: now,
        }
    }
}
