use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use unite_types::api::ConversationSummary;
use unite_types::models::{Agent, Conversation};

use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;

const PREVIEW_CHARS: usize = 60;

/// Last message cut to 60 characters, `...` appended when cut.
pub fn preview(conversation: &Conversation) -> String {
    let Some(last) = conversation.messages.last() else {
        return "Sem mensagens".to_string();
    };
    let mut chars = last.content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// A user's conversations, most recently active first.
pub fn list_summaries<R: ChatRepository + ?Sized>(repo: &R, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
    let conversations = repo.list_conversations_for_user(user_id)?;

    let mut agents: HashMap<Uuid, Option<Agent>> = HashMap::new();
    let mut summaries = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        if !agents.contains_key(&conversation.agent_id) {
            let agent = repo.get_agent(conversation.agent_id)?;
            agents.insert(conversation.agent_id, agent);
        }
        let Some(agent) = agents.get(&conversation.agent_id).and_then(Option::as_ref) else {
            warn!(
                "Conversation {} references missing agent {}",
                conversation.id, conversation.agent_id
            );
            continue;
        };

        summaries.push(ConversationSummary {
            id: conversation.id,
            agent_id: agent.id,
            agent_name: agent.name.clone(),
            agent_slug: agent.slug.clone(),
            started_at: conversation.started_at,
            last_message_at: conversation.last_message_at,
            message_count: conversation.messages.len(),
            preview: preview(conversation),
        });
    }

    Ok(summaries)
}

/// The conversation with its messages. Other users' conversations read as missing.
pub fn get_conversation<R: ChatRepository + ?Sized>(repo: &R, user_id: Uuid, id: Uuid) -> Result<Conversation> {
    match repo.get_conversation(id)? {
        Some(conversation) if conversation.user_id == user_id => Ok(conversation),
        Some(_) => {
            warn!("User {} asked for conversation {} they do not own", user_id, id);
            Err(ChatError::not_found("conversation", id))
        }
        None => Err(ChatError::not_found("conversation", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::send_to_agent;
    use crate::test_support::{seeded_memory, user_id};
    use unite_types::models::timestamp_now;

    #[test]
    fn preview_truncates_long_messages() {
        let repo = seeded_memory();
        let long = "á".repeat(61);
        let exchange = send_to_agent(&repo, user_id(), "incidentes", None, &long).unwrap();
        let mut conversation = repo.get_conversation(exchange.conversation_id).unwrap().unwrap();

        conversation.messages.pop();
        assert_eq!(preview(&conversation), format!("{}...", "á".repeat(60)));

        conversation.messages.clear();
        assert_eq!(preview(&conversation), "Sem mensagens");
    }

    #[test]
    fn summaries_are_most_recent_first() {
        let repo = seeded_memory();
        let older = send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();
        let newer = send_to_agent(&repo, user_id(), "social-media", None, "obrigado").unwrap();
        // bump the older thread past the newer one
        send_to_agent(&repo, user_id(), "incidentes", Some(older.conversation_id), "ajuda").unwrap();

        let summaries = list_summaries(&repo, user_id()).unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].last_message_at >= summaries[1].last_message_at);
        let incidentes = summaries.iter().find(|s| s.id == older.conversation_id).unwrap();
        assert_eq!(incidentes.agent_slug, "incidentes");
        assert_eq!(incidentes.message_count, 4);
        let social = summaries.iter().find(|s| s.id == newer.conversation_id).unwrap();
        assert_eq!(
            social.preview,
            "De nada! Estou sempre à disposição para ajudar. Tem mais alg..."
        );
    }

    #[test]
    fn empty_conversation_summary() {
        let repo = seeded_memory();
        let agent = repo.get_agent_by_slug("incidentes").unwrap().unwrap();
        repo.insert_conversation(&Conversation::new(user_id(), agent.id, timestamp_now()))
            .unwrap();
        let summaries = list_summaries(&repo, user_id()).unwrap();
        assert_eq!(summaries[0].preview, "Sem mensagens");
        assert_eq!(summaries[0].message_count, 0);
    }

    #[test]
    fn foreign_conversation_reads_as_missing() {
        let repo = seeded_memory();
        let exchange = send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();
        assert!(get_conversation(&repo, user_id(), exchange.conversation_id).is_ok());
        let err = get_conversation(&repo, Uuid::new_v4(), exchange.conversation_id).unwrap_err();
        assert!(matches!(err, ChatError::NotFound { .. }));
    }
}
