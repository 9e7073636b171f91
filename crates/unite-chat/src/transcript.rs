//! Client-side view of one chat.
//!
//! A send shows up immediately as a [`Entry::Pending`] placeholder. When the
//! server answers, the placeholder is swapped for the stored user message and
//! the agent's reply. When the send fails, the placeholder stays on screen as
//! [`Entry::Failed`] until it is retried or discarded. Only one send may be in
//! flight at a time.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use unite_types::api::Exchange;
use unite_types::models::{Conversation, Message, timestamp_now};

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Pending {
        local_id: Uuid,
        content: String,
        timestamp: DateTime<Utc>,
    },
    Failed {
        local_id: Uuid,
        content: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },
    Confirmed(Message),
}

impl Entry {
    pub fn local_id(&self) -> Option<Uuid> {
        match self {
            Entry::Pending { local_id, .. } | Entry::Failed { local_id, .. } => Some(*local_id),
            Entry::Confirmed(_) => None,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Entry::Pending { content, .. } | Entry::Failed { content, .. } => content,
            Entry::Confirmed(message) => &message.content,
        }
    }
}

/// What the caller should send to the server for a submitted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub local_id: Uuid,
    pub content: String,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    conversation_id: Option<Uuid>,
    in_flight: Option<Uuid>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume an existing conversation.
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            entries: conversation.messages.iter().cloned().map(Entry::Confirmed).collect(),
            conversation_id: Some(conversation.id),
            in_flight: None,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn conversation_id(&self) -> Option<Uuid> {
        self.conversation_id
    }

    /// Input is disabled while a send is outstanding.
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Queue `text` for sending. `None` when the text is blank or another
    /// send has not settled yet.
    pub fn submit(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() || self.is_sending() {
            return None;
        }

        let local_id = Uuid::new_v4();
        self.entries.push(Entry::Pending {
            local_id,
            content: text.to_string(),
            timestamp: timestamp_now(),
        });
        self.in_flight = Some(local_id);

        Some(PendingSend {
            local_id,
            content: text.to_string(),
            conversation_id: self.conversation_id,
        })
    }

    /// Replace the placeholder with the stored user message and the reply.
    /// Returns false when no pending entry has this id.
    pub fn confirm(&mut self, local_id: Uuid, exchange: &Exchange) -> bool {
        let Some(pos) = self.position(local_id, |e| matches!(e, Entry::Pending { .. })) else {
            return false;
        };

        self.entries.remove(pos);
        self.entries.push(Entry::Confirmed(exchange.user_message.clone()));
        self.entries.push(Entry::Confirmed(exchange.reply.clone()));
        self.conversation_id = Some(exchange.conversation_id);
        self.settle(local_id);
        true
    }

    /// Keep the placeholder visible, marked as failed.
    pub fn fail(&mut self, local_id: Uuid, reason: impl Into<String>) -> bool {
        let Some(pos) = self.position(local_id, |e| matches!(e, Entry::Pending { .. })) else {
            return false;
        };

        if let Entry::Pending { content, timestamp, .. } = self.entries[pos].clone() {
            self.entries[pos] = Entry::Failed {
                local_id,
                content,
                timestamp,
                reason: reason.into(),
            };
        }
        self.settle(local_id);
        true
    }

    /// Send a failed entry again. Subject to the same one-in-flight rule as `submit`.
    pub fn retry(&mut self, local_id: Uuid) -> Option<PendingSend> {
        if self.is_sending() {
            return None;
        }
        let pos = self.position(local_id, |e| matches!(e, Entry::Failed { .. }))?;

        let content = self.entries[pos].content().to_string();
        self.entries[pos] = Entry::Pending {
            local_id,
            content: content.clone(),
            timestamp: timestamp_now(),
        };
        self.in_flight = Some(local_id);

        Some(PendingSend {
            local_id,
            content,
            conversation_id: self.conversation_id,
        })
    }

    /// Drop a failed entry.
    pub fn discard(&mut self, local_id: Uuid) -> bool {
        match self.position(local_id, |e| matches!(e, Entry::Failed { .. })) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    fn position(&self, local_id: Uuid, kind: impl Fn(&Entry) -> bool) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.local_id() == Some(local_id) && kind(e))
    }

    fn settle(&mut self, local_id: Uuid) {
        if self.in_flight == Some(local_id) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::send_to_agent;
    use crate::repository::ChatRepository;
    use crate::test_support::{seeded_memory, user_id};

    fn has_placeholder(transcript: &Transcript, local_id: Uuid) -> bool {
        transcript.entries().iter().any(|e| e.local_id() == Some(local_id))
    }

    #[test]
    fn blank_text_is_ignored() {
        let mut transcript = Transcript::new();
        assert!(transcript.submit("  \n").is_none());
        assert!(transcript.entries().is_empty());
        assert!(!transcript.is_sending());
    }

    #[test]
    fn only_one_send_in_flight() {
        let mut transcript = Transcript::new();
        assert!(transcript.submit("oi").is_some());
        assert!(transcript.is_sending());
        assert!(transcript.submit("de novo").is_none());
        assert_eq!(transcript.entries().len(), 1);
    }

    #[test]
    fn confirmed_send_replaces_the_placeholder() {
        let repo = seeded_memory();
        let mut transcript = Transcript::new();

        let send = transcript.submit("ajuda").unwrap();
        assert_eq!(send.conversation_id, None);
        let exchange = send_to_agent(&repo, user_id(), "incidentes", send.conversation_id, &send.content).unwrap();

        assert!(transcript.confirm(send.local_id, &exchange));
        assert!(!has_placeholder(&transcript, send.local_id));
        assert_eq!(
            transcript.entries(),
            [
                Entry::Confirmed(exchange.user_message.clone()),
                Entry::Confirmed(exchange.reply.clone())
            ]
        );
        assert_eq!(transcript.conversation_id(), Some(exchange.conversation_id));
        assert!(!transcript.is_sending());

        let next = transcript.submit("obrigado").unwrap();
        assert_eq!(next.conversation_id, Some(exchange.conversation_id));
    }

    #[test]
    fn failed_send_stays_visible_until_discarded() {
        let mut transcript = Transcript::new();
        let send = transcript.submit("oi").unwrap();

        assert!(transcript.fail(send.local_id, "network down"));
        assert!(has_placeholder(&transcript, send.local_id));
        assert!(matches!(
            &transcript.entries()[0],
            Entry::Failed { reason, content, .. } if reason == "network down" && content == "oi"
        ));
        assert!(!transcript.is_sending());

        // settled entries cannot be confirmed or failed again
        assert!(!transcript.fail(send.local_id, "again"));

        assert!(transcript.discard(send.local_id));
        assert!(transcript.entries().is_empty());
    }

    #[test]
    fn retry_turns_a_failure_back_into_a_send() {
        let repo = seeded_memory();
        let mut transcript = Transcript::new();
        let send = transcript.submit("oi").unwrap();
        transcript.fail(send.local_id, "timeout");

        let again = transcript.retry(send.local_id).unwrap();
        assert_eq!(again.local_id, send.local_id);
        assert_eq!(again.content, "oi");
        assert!(transcript.is_sending());
        assert!(!transcript.discard(send.local_id));

        let exchange = send_to_agent(&repo, user_id(), "incidentes", None, &again.content).unwrap();
        assert!(transcript.confirm(again.local_id, &exchange));
        assert_eq!(transcript.entries().len(), 2);
    }

    #[test]
    fn resumes_from_a_stored_conversation() {
        let repo = seeded_memory();
        let exchange = send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();
        let conversation = repo.get_conversation(exchange.conversation_id).unwrap().unwrap();

        let transcript = Transcript::from_conversation(&conversation);
        assert_eq!(transcript.entries().len(), 2);
        assert_eq!(transcript.entries()[1].content(), exchange.reply.content);
        assert_eq!(transcript.conversation_id(), Some(conversation.id));
    }
}
