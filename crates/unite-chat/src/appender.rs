use tracing::debug;
use uuid::Uuid;

use unite_types::models::{Message, SenderKind, timestamp_now};

use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;

/// Append a message and stamp the conversation's last activity with its timestamp.
/// Both writes land together or not at all.
pub fn append_message<R: ChatRepository + ?Sized>(
    repo: &R,
    conversation_id: Uuid,
    content: &str,
    sender_id: Uuid,
    sender_kind: SenderKind,
) -> Result<Message> {
    let message = repo
        .append_message(conversation_id, content, sender_id, sender_kind, timestamp_now())?
        .ok_or_else(|| ChatError::not_found("conversation", conversation_id))?;

    debug!(
        "Appended {} message {} to conversation {}",
        sender_kind, message.id, conversation_id
    );
    Ok(message)
}
