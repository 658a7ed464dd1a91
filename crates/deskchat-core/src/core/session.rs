//! Transcript store for a single chat session.
//!
//! Owns the ordered message sequence plus the busy/error flags, and exposes
//! controlled mutation primitives (`append`, `patch`, `reset`, flag setters).
//! Nothing outside this module mutates the sequence directly; the controller
//! drives every change through these operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a message within one session.
///
/// Assigned from a monotone counter at append time. Unique for the lifetime
/// of the store and never reused, including across `reset`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

/// Sender of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Source ticket citation attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub ticket_id: String,
    /// Similarity to the user's question, in [0, 1].
    pub similarity_score: f32,
}

/// Follow-up operation proposed by an assistant reply.
///
/// Immutable once attached to a message; consuming one flips the owning
/// message's `actions_executed` flag, never the link itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    pub label: String,
    pub tool_call: String,
    pub is_tool_action: bool,
}

/// One transcript entry.
///
/// Append-only apart from one documented path: a processing placeholder is
/// patched in place to its terminal outcome. `timestamp` is fixed at append.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_error: bool,
    pub requires_human: bool,
    pub is_processing: bool,
    pub is_tool_result: bool,
    /// Answer confidence reported by the service; `None` for user messages,
    /// error entries, and placeholders.
    pub confidence: Option<f32>,
    pub sources: Vec<Citation>,
    pub action_links: Vec<ActionLink>,
    pub actions_executed: bool,
}

impl Message {
    /// Returns true if this message still has unconsumed action links.
    pub fn has_pending_actions(&self) -> bool {
        !self.action_links.is_empty() && !self.actions_executed
    }
}

/// A message before the transcript has assigned it an id and timestamp.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub requires_human: bool,
    pub is_processing: bool,
    pub is_tool_result: bool,
    pub confidence: Option<f32>,
    pub sources: Vec<Citation>,
    pub action_links: Vec<ActionLink>,
}

impl MessageDraft {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            is_error: false,
            requires_human: false,
            is_processing: false,
            is_tool_result: false,
            confidence: None,
            sources: Vec::new(),
            action_links: Vec::new(),
        }
    }

    /// Creates a user message draft.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message draft.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Marks the draft as an error entry.
    #[must_use]
    pub fn error(mut self) -> Self {
        self.is_error = true;
        self
    }

    /// Marks the draft as a processing placeholder.
    #[must_use]
    pub fn processing(mut self) -> Self {
        self.is_processing = true;
        self
    }

    #[must_use]
    pub fn requires_human(mut self, requires_human: bool) -> Self {
        self.requires_human = requires_human;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Citation>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_action_links(mut self, action_links: Vec<ActionLink>) -> Self {
        self.action_links = action_links;
        self
    }
}

/// Partial update applied to an existing message by [`Transcript::patch`].
///
/// Only the fields a flow is allowed to rewrite are present; identity,
/// position, and timestamp are not patchable.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub is_error: Option<bool>,
    pub is_processing: Option<bool>,
    pub is_tool_result: Option<bool>,
    pub actions_executed: Option<bool>,
}

impl MessagePatch {
    /// Patch that marks a message's actions as consumed.
    pub fn actions_consumed() -> Self {
        Self {
            actions_executed: Some(true),
            ..Self::default()
        }
    }

    /// Patch that resolves a processing placeholder into its outcome.
    pub fn outcome(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            is_processing: Some(false),
            is_tool_result: Some(true),
            ..Self::default()
        }
    }

    /// Patch that resolves a processing placeholder into a terminal error.
    pub fn outcome_error(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            is_processing: Some(false),
            is_error: Some(true),
            ..Self::default()
        }
    }
}

/// Ordered message sequence and session flags for one chat view.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    is_loading: bool,
    last_error: Option<String>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript seeded with a single message (e.g., a greeting).
    pub fn with_seed(seed: MessageDraft) -> Self {
        let mut transcript = Self::new();
        transcript.append(seed);
        transcript
    }

    /// Appends a message, assigning the next id. Returns the assigned id.
    pub fn append(&mut self, draft: MessageDraft) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role: draft.role,
            content: draft.content,
            timestamp: Utc::now(),
            is_error: draft.is_error,
            requires_human: draft.requires_human,
            is_processing: draft.is_processing,
            is_tool_result: draft.is_tool_result,
            confidence: draft.confidence,
            sources: draft.sources,
            action_links: draft.action_links,
            actions_executed: false,
        });
        id
    }

    /// Merges `patch` into the message with `id`, preserving identity and
    /// position.
    ///
    /// A missing id is a defensive no-op, not an error: only the controller
    /// that created an id calls patch, so the id exists in normal operation,
    /// and a stale id after `reset` must not take the session down.
    /// `actions_executed` merges with OR: once consumed, always consumed.
    pub fn patch(&mut self, id: MessageId, patch: MessagePatch) {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if let Some(content) = patch.content {
            message.content = content;
        }
        if let Some(is_error) = patch.is_error {
            message.is_error = is_error;
        }
        if let Some(is_processing) = patch.is_processing {
            message.is_processing = is_processing;
        }
        if let Some(is_tool_result) = patch.is_tool_result {
            message.is_tool_result = is_tool_result;
        }
        if let Some(actions_executed) = patch.actions_executed {
            message.actions_executed |= actions_executed;
        }
    }

    /// Replaces the sequence with `seed` (or nothing) and clears `last_error`.
    ///
    /// The id counter is not reset, so ids are never reused.
    pub fn reset(&mut self, seed: Option<MessageDraft>) {
        self.messages.clear();
        self.last_error = None;
        if let Some(seed) = seed {
            self.append(seed);
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// The ordered message sequence (insertion order is display order).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
