use chrono::{DateTime, Utc};
use uuid::Uuid;

use unite_db::Database;
use unite_types::models::{Agent, Conversation, Message, Sector, SenderKind, User};

/// Persistence seam for the chat core. One implementation per backing store;
/// the core never touches storage any other way.
pub trait ChatRepository: Send + Sync {
    // -- Users --
    fn list_users(&self) -> anyhow::Result<Vec<User>>;
    fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    fn insert_user(&self, user: &User) -> anyhow::Result<()>;
    fn update_user(&self, user: &User) -> anyhow::Result<bool>;
    /// Also removes the user's conversations and their messages.
    fn delete_user(&self, id: Uuid) -> anyhow::Result<bool>;

    // -- Agents --
    fn list_agents(&self) -> anyhow::Result<Vec<Agent>>;
    fn list_agents_by_sector(&self, sector: Sector) -> anyhow::Result<Vec<Agent>>;
    fn get_agent(&self, id: Uuid) -> anyhow::Result<Option<Agent>>;
    fn get_agent_by_slug(&self, slug: &str) -> anyhow::Result<Option<Agent>>;
    fn insert_agent(&self, agent: &Agent) -> anyhow::Result<()>;
    fn update_agent(&self, agent: &Agent) -> anyhow::Result<bool>;
    fn delete_agent(&self, id: Uuid) -> anyhow::Result<bool>;
    fn count_conversations_for_agent(&self, agent_id: Uuid) -> anyhow::Result<usize>;

    // -- Conversations --
    fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()>;
    fn get_conversation(&self, id: Uuid) -> anyhow::Result<Option<Conversation>>;
    fn list_conversations_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Conversation>>;

    /// Atomically insert a message and set the conversation's
    /// `last_message_at` to its timestamp, `max(now, last_message_at)`.
    /// `None` when the conversation does not exist.
    fn append_message(
        &self,
        conversation_id: Uuid,
        content: &str,
        sender_id: Uuid,
        sender_kind: SenderKind,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Message>>;

    /// Whether a write failed because a unique key was already taken or a
    /// delete hit a row that is still referenced.
    fn is_conflict(&self, _err: &anyhow::Error) -> bool {
        false
    }
}

impl ChatRepository for Database {
    fn list_users(&self) -> anyhow::Result<Vec<User>> {
        Database::list_users(self)
    }

    fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Database::get_user(self, id)
    }

    fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Database::get_user_by_email(self, email)
    }

    fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        Database::insert_user(self, user)
    }

    fn update_user(&self, user: &User) -> anyhow::Result<bool> {
        Database::update_user(self, user)
    }

    fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        Database::delete_user(self, id)
    }

    fn list_agents(&self) -> anyhow::Result<Vec<Agent>> {
        Database::list_agents(self)
    }

    fn list_agents_by_sector(&self, sector: Sector) -> anyhow::Result<Vec<Agent>> {
        Database::list_agents_by_sector(self, sector)
    }

    fn get_agent(&self, id: Uuid) -> anyhow::Result<Option<Agent>> {
        Database::get_agent(self, id)
    }

    fn get_agent_by_slug(&self, slug: &str) -> anyhow::Result<Option<Agent>> {
        Database::get_agent_by_slug(self, slug)
    }

    fn insert_agent(&self, agent: &Agent) -> anyhow::Result<()> {
        Database::insert_agent(self, agent)
    }

    fn update_agent(&self, agent: &Agent) -> anyhow::Result<bool> {
        Database::update_agent(self, agent)
    }

    fn delete_agent(&self, id: Uuid) -> anyhow::Result<bool> {
        Database::delete_agent(self, id)
    }

    fn count_conversations_for_agent(&self, agent_id: Uuid) -> anyhow::Result<usize> {
        Database::count_conversations_for_agent(self, agent_id)
    }

    fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()> {
        Database::insert_conversation(self, conversation)
    }

    fn get_conversation(&self, id: Uuid) -> anyhow::Result<Option<Conversation>> {
        Database::get_conversation(self, id)
    }

    fn list_conversations_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Conversation>> {
        Database::list_conversations_for_user(self, user_id)
    }

    fn append_message(
        &self,
        conversation_id: Uuid,
        content: &str,
        sender_id: Uuid,
        sender_kind: SenderKind,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Message>> {
        Database::append_message(self, conversation_id, content, sender_id, sender_kind, now)
    }

    fn is_conflict(&self, err: &anyhow::Error) -> bool {
        unite_db::queries::is_unique_violation(err) || unite_db::queries::is_foreign_key_violation(err)
    }
}
