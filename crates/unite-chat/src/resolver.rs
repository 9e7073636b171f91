use tracing::{debug, warn};
use uuid::Uuid;

use unite_types::models::{Agent, Conversation, timestamp_now};

use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;

pub struct Resolved {
    pub agent: Agent,
    pub conversation: Conversation,
    pub created: bool,
}

/// Find the conversation a send belongs to, creating one when needed.
///
/// A supplied `conversation_id` is reused only if it exists and belongs to
/// the same user and agent. Without one, a fresh conversation is always
/// created: a user can hold any number of threads with the same agent.
pub fn resolve_conversation<R: ChatRepository + ?Sized>(
    repo: &R,
    user_id: Uuid,
    agent_slug: &str,
    conversation_id: Option<Uuid>,
) -> Result<Resolved> {
    let agent = repo
        .get_agent_by_slug(agent_slug)?
        .ok_or_else(|| ChatError::not_found("agent", agent_slug))?;

    if repo.get_user(user_id)?.is_none() {
        return Err(ChatError::not_found("user", user_id));
    }

    if let Some(id) = conversation_id {
        match repo.get_conversation(id)? {
            Some(existing) if existing.user_id == user_id && existing.agent_id == agent.id => {
                debug!("Reusing conversation {}", id);
                return Ok(Resolved {
                    agent,
                    conversation: existing,
                    created: false,
                });
            }
            Some(_) => warn!(
                "Conversation {} does not belong to user {} and agent '{}'; starting a new one",
                id, user_id, agent.slug
            ),
            None => debug!("Conversation {} not found; starting a new one", id),
        }
    }

    let conversation = Conversation::new(user_id, agent.id, timestamp_now());
    repo.insert_conversation(&conversation)?;
    debug!("Created conversation {} for user {} with '{}'", conversation.id, user_id, agent.slug);

    Ok(Resolved {
        agent,
        conversation,
        created: true,
    })
}
