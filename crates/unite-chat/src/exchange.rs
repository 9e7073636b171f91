use tracing::info;
use uuid::Uuid;

use unite_types::api::Exchange;
use unite_types::models::SenderKind;

use crate::appender::append_message;
use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;
use crate::resolver::resolve_conversation;
use crate::responder::synthesize;

/// One user send: resolve the conversation, store the user's message,
/// build the agent's reply and store it.
///
/// Each step commits on its own. If the reply cannot be stored, the user's
/// message stays persisted and the error is returned.
pub fn send_to_agent<R: ChatRepository + ?Sized>(
    repo: &R,
    user_id: Uuid,
    agent_slug: &str,
    conversation_id: Option<Uuid>,
    content: &str,
) -> Result<Exchange> {
    if content.trim().is_empty() {
        return Err(ChatError::InvalidInput("message content is empty".into()));
    }

    let resolved = resolve_conversation(repo, user_id, agent_slug, conversation_id)?;
    let agent = resolved.agent;
    let conversation_id = resolved.conversation.id;

    let user_message = append_message(repo, conversation_id, content, user_id, SenderKind::User)?;
    let reply_text = synthesize(Some(agent.sector), content);
    let reply = append_message(repo, conversation_id, &reply_text, agent.id, SenderKind::Agent)?;

    info!(
        "User {} -> '{}' in conversation {}{}",
        user_id,
        agent.slug,
        conversation_id,
        if resolved.created { " (new)" } else { "" }
    );

    Ok(Exchange {
        conversation_id,
        chat_url: agent.chat_url(conversation_id),
        user_message,
        reply,
    })
}
