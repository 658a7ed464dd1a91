//! Interaction controller: the three user-visible session flows.
//!
//! Orchestrates submit-question, execute-action, and reset as explicit
//! sequences of transcript mutations around at most one suspension point
//! each. Every flow takes `&mut self`, so flows are serialized per session:
//! a second flow cannot start while one is suspended, and `is_loading`
//! brackets exactly one flow at a time.
//!
//! No failure escapes a flow. Service and executor errors are absorbed into
//! transcript state (an error entry or a terminal placeholder) and mirrored
//! into the session's `last_error`.

use tracing::{debug, warn};

use crate::core::actions::{ActionExecutor, ActionRegistry};
use crate::core::session::{
    ActionLink, MessageDraft, MessageId, MessagePatch, Transcript,
};
use crate::services::answer::{AnswerResponse, AnswerService};
use crate::services::shared::ServiceError;

/// Assistant label used in the greeting when no agent is selected.
pub const DEFAULT_AGENT_LABEL: &str = "AI assistant";

const GENERIC_REQUEST_FAILURE: &str = "Failed to get response. Please try again.";

/// Where the controller currently is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No flow in progress, ready for input.
    #[default]
    Idle,
    /// Suspended on the answer service call.
    AwaitingAnswer,
    /// Suspended on a triggered action's execution.
    AwaitingActionOutcome,
}

/// Agent a chat session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentContext {
    pub id: String,
    pub name: String,
}

/// Session controller binding a transcript to the external collaborators.
///
/// Constructed per chat view and torn down with it; there is no ambient
/// session state anywhere else.
pub struct ChatController<S, E> {
    transcript: Transcript,
    registry: ActionRegistry,
    service: S,
    executor: E,
    agent: Option<AgentContext>,
    phase: SessionPhase,
}

impl<S: AnswerService, E: ActionExecutor> ChatController<S, E> {
    /// Creates a controller with a greeting seeded for the selected agent.
    pub fn new(
        service: S,
        executor: E,
        registry: ActionRegistry,
        agent: Option<AgentContext>,
    ) -> Self {
        let name = agent
            .as_ref()
            .map_or(DEFAULT_AGENT_LABEL, |a| a.name.as_str());
        Self {
            transcript: Transcript::with_seed(greeting(name)),
            registry,
            service,
            executor,
            agent,
            phase: SessionPhase::Idle,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn agent(&self) -> Option<&AgentContext> {
        self.agent.as_ref()
    }

    /// Flow A: submits a question and appends the reply (or an error entry).
    ///
    /// An empty question (after trimming) is silently dropped: no service
    /// call, no transcript change.
    pub async fn submit(&mut self, question: &str) {
        let question = question.trim();
        if question.is_empty() {
            return;
        }

        self.transcript.append(MessageDraft::user(question));
        self.transcript.set_loading(true);
        self.transcript.set_error(None);
        self.phase = SessionPhase::AwaitingAnswer;

        let agent_id = self.agent.as_ref().map(|a| a.id.as_str());
        let result = self.service.submit_question(question, agent_id).await;

        // Both arms fall through to the loading reset below; nothing in
        // between returns early.
        match result {
            Ok(response) => {
                self.transcript.append(assistant_draft(response));
            }
            Err(err) => {
                let detail = failure_detail(&err);
                warn!(kind = %err.kind, %detail, "answer service request failed");
                self.transcript.set_error(Some(detail.clone()));
                self.transcript.append(
                    MessageDraft::assistant(format!(
                        "Sorry, I encountered an error: {detail}"
                    ))
                    .error(),
                );
            }
        }

        self.transcript.set_loading(false);
        self.phase = SessionPhase::Idle;
    }

    /// Flow B: executes a proposed action through its two-phase lifecycle.
    ///
    /// The originating message's actions are marked consumed before the
    /// first await, so a repeated click cannot double-trigger the same
    /// action set even if the UI keeps the buttons visible.
    pub async fn execute_action(&mut self, link: &ActionLink, origin: MessageId) {
        self.transcript.patch(origin, MessagePatch::actions_consumed());

        let profile = self.registry.profile(&link.tool_call).clone();
        if !self.registry.is_registered(&link.tool_call) {
            debug!(tool_call = %link.tool_call, "no profile registered, using fallback");
        }

        let placeholder = self.transcript.append(
            MessageDraft::assistant(profile.processing_text.clone()).processing(),
        );
        self.transcript.set_loading(true);
        self.phase = SessionPhase::AwaitingActionOutcome;

        let result = self.executor.execute(link, &profile).await;

        match result {
            Ok(()) => {
                self.transcript
                    .patch(placeholder, MessagePatch::outcome(profile.outcome_text));
            }
            Err(err) => {
                let detail = failure_detail(&err);
                warn!(tool_call = %link.tool_call, %detail, "action execution failed");
                self.transcript.set_error(Some(detail.clone()));
                self.transcript.patch(
                    placeholder,
                    MessagePatch::outcome_error(format!(
                        "Sorry, I couldn't complete that action: {detail}"
                    )),
                );
            }
        }

        self.transcript.set_loading(false);
        self.phase = SessionPhase::Idle;
    }

    /// Flow C: resets the session to a fresh greeting.
    ///
    /// Passing a name rebinds the greeting (e.g., after selecting another
    /// agent); otherwise the current agent's name is kept.
    pub fn reset(&mut self, agent_name: Option<&str>) {
        let name = agent_name.unwrap_or_else(|| {
            self.agent
                .as_ref()
                .map_or(DEFAULT_AGENT_LABEL, |a| a.name.as_str())
        });
        self.transcript.reset(Some(greeting(name)));
        self.phase = SessionPhase::Idle;
    }
}

fn greeting(agent_name: &str) -> MessageDraft {
    MessageDraft::assistant(format!(
        "Hello! I'm your {agent_name}. How can I help you today?"
    ))
}

/// Human-readable failure detail: the backend's own wording when it gave
/// one, else a generic line.
fn failure_detail(err: &ServiceError) -> String {
    err.backend_detail()
        .unwrap_or(GENERIC_REQUEST_FAILURE)
        .to_string()
}

/// Builds the assistant transcript entry for a successful answer.
///
/// Citations are dropped on human-handoff replies: the UI hides them there,
/// and the engine owns that rule so downstream consumers cannot disagree.
fn assistant_draft(response: AnswerResponse) -> MessageDraft {
    let sources = if response.requires_human {
        Vec::new()
    } else {
        response.sources.into_iter().map(Into::into).collect()
    };
    MessageDraft::assistant(response.answer)
        .requires_human(response.requires_human)
        .with_confidence(response.confidence)
        .with_sources(sources)
        .with_action_links(response.action_links.into_iter().map(Into::into).collect())
}
