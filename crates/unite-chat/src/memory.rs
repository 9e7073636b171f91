use std::sync::Mutex;

use anyhow::anyhow;
use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use uuid::Uuid;

use unite_types::models::{Agent, Conversation, Message, Sector, SenderKind, User};

use crate::repository::ChatRepository;

#[derive(Debug, Error)]
#[error("duplicate {0}")]
struct Duplicate(&'static str);

#[derive(Debug, Error)]
#[error("{0} is still referenced by conversations")]
struct Referenced(&'static str);

#[derive(Default)]
struct State {
    users: Vec<User>,
    agents: Vec<Agent>,
    conversations: Vec<Conversation>,
}

/// Process-local repository. Every operation runs under one lock, so
/// `append_message` is as atomic here as the SQLite transaction is.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: Vec<Agent>) -> Self {
        Self {
            state: Mutex::new(State {
                agents,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, State>> {
        self.state.lock().map_err(|e| anyhow!("memory store lock poisoned: {}", e))
    }
}

impl ChatRepository for MemoryRepository {
    fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let mut users = self.lock()?.users.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.id == user.id || u.email == user.email) {
            return Err(Duplicate("user").into());
        }
        state.users.push(user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(Duplicate("email").into());
        }
        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        state.conversations.retain(|c| c.user_id != id);
        Ok(state.users.len() < before)
    }

    fn list_agents(&self) -> anyhow::Result<Vec<Agent>> {
        let mut agents = self.lock()?.agents.clone();
        agents.sort_by(|a, b| (a.sector.as_ref(), &a.name).cmp(&(b.sector.as_ref(), &b.name)));
        Ok(agents)
    }

    fn list_agents_by_sector(&self, sector: Sector) -> anyhow::Result<Vec<Agent>> {
        let mut agents: Vec<Agent> = self
            .lock()?
            .agents
            .iter()
            .filter(|a| a.sector == sector)
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(agents)
    }

    fn get_agent(&self, id: Uuid) -> anyhow::Result<Option<Agent>> {
        Ok(self.lock()?.agents.iter().find(|a| a.id == id).cloned())
    }

    fn get_agent_by_slug(&self, slug: &str) -> anyhow::Result<Option<Agent>> {
        Ok(self.lock()?.agents.iter().find(|a| a.slug == slug).cloned())
    }

    fn insert_agent(&self, agent: &Agent) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        if state.agents.iter().any(|a| a.id == agent.id || a.slug == agent.slug) {
            return Err(Duplicate("agent").into());
        }
        state.agents.push(agent.clone());
        Ok(())
    }

    fn update_agent(&self, agent: &Agent) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        if state.agents.iter().any(|a| a.id != agent.id && a.slug == agent.slug) {
            return Err(Duplicate("slug").into());
        }
        match state.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(slot) => {
                *slot = agent.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_agent(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        if state.conversations.iter().any(|c| c.agent_id == id) {
            return Err(Referenced("agent").into());
        }
        let before = state.agents.len();
        state.agents.retain(|a| a.id != id);
        Ok(state.agents.len() < before)
    }

    fn count_conversations_for_agent(&self, agent_id: Uuid) -> anyhow::Result<usize> {
        Ok(self
            .lock()?
            .conversations
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .count())
    }

    fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        if state.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(Duplicate("conversation").into());
        }
        state.conversations.push(conversation.clone());
        Ok(())
    }

    fn get_conversation(&self, id: Uuid) -> anyhow::Result<Option<Conversation>> {
        Ok(self.lock()?.conversations.iter().find(|c| c.id == id).cloned())
    }

    fn list_conversations_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .lock()?
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    fn append_message(
        &self,
        conversation_id: Uuid,
        content: &str,
        sender_id: Uuid,
        sender_kind: SenderKind,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Message>> {
        let mut state = self.lock()?;
        let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == conversation_id) else {
            return Ok(None);
        };

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            content: content.to_string(),
            sender_id,
            sender_kind,
            timestamp: now.trunc_subsecs(3).max(conversation.last_message_at),
        };
        conversation.last_message_at = message.timestamp;
        conversation.messages.push(message.clone());

        Ok(Some(message))
    }

    fn is_conflict(&self, err: &anyhow::Error) -> bool {
        err.is::<Duplicate>() || err.is::<Referenced>()
    }
}
