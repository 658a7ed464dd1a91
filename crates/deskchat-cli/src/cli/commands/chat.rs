//! Interactive chat command.
//!
//! Provides a REPL-style chat loop over generic reader/writer handles, so
//! the loop is testable without a terminal. Assistant replies render
//! citations, human-handoff banners, and numbered action links; typing a
//! number runs the corresponding action.

use std::io::{BufRead, Write};

use anyhow::Result;
use deskchat_core::config::Config;
use deskchat_core::core::actions::{ActionExecutor, ActionRegistry, SimulatedExecutor};
use deskchat_core::core::controller::{AgentContext, ChatController};
use deskchat_core::core::session::{ActionLink, Message, MessageId, Role};
use deskchat_core::services::agents::AgentDirectoryClient;
use deskchat_core::services::answer::{AnswerService, HttpAnswerClient};

const QUIT_COMMAND: &str = ":q";
const PROMPT_PREFIX: &str = "you> ";
const AGENT_PREFIX: &str = "agent> ";

/// Citations rendered per message before eliding the rest.
const MAX_RENDERED_SOURCES: usize = 2;

pub async fn run(config: &Config, agent_id: Option<&str>) -> Result<()> {
    let agent_id = agent_id.or(config.chat.agent.as_deref());

    // Resolve the display name from the directory when an agent was chosen.
    // The backend enforces agent existence on every chat call anyway, so a
    // failed lookup here only degrades the greeting to the raw id.
    let agent = match agent_id {
        Some(id) => {
            let directory = AgentDirectoryClient::new(&config.service)?;
            let name = match directory.agent_status(id).await {
                Ok(summary) => summary.name,
                Err(_) => id.to_string(),
            };
            Some(AgentContext {
                id: id.to_string(),
                name,
            })
        }
        None => None,
    };

    let service = HttpAnswerClient::new(&config.service)?;
    let registry = ActionRegistry::from_config(&config.actions);
    let mut controller = ChatController::new(service, SimulatedExecutor, registry, agent);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    writeln!(stdout, "deskchat (type :q to quit)")?;
    run_chat(stdin.lock(), &mut stdout, &mut controller).await
}

/// Runs the chat loop with provided handles (for testing).
pub async fn run_chat<R, W, S, E>(
    input: R,
    output: &mut W,
    controller: &mut ChatController<S, E>,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    S: AnswerService,
    E: ActionExecutor,
{
    // Render the seeded greeting before the first prompt.
    let mut rendered = render_from(output, controller, 0)?;

    write!(output, "{PROMPT_PREFIX}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed == QUIT_COMMAND {
            writeln!(output, "Goodbye!")?;
            break;
        }

        if trimmed.is_empty() {
            write!(output, "{PROMPT_PREFIX}")?;
            output.flush()?;
            continue;
        }

        if let Ok(choice) = trimmed.parse::<usize>() {
            match pending_action(controller, choice) {
                Some((link, origin)) => {
                    writeln!(output, "⚙ Running {}...", link.label)?;
                    output.flush()?;
                    controller.execute_action(&link, origin).await;
                }
                None => writeln!(output, "No pending action #{choice}.")?,
            }
        } else {
            controller.submit(trimmed).await;
        }

        rendered = render_from(output, controller, rendered)?;
        write!(output, "{PROMPT_PREFIX}")?;
        output.flush()?;
    }

    Ok(())
}

/// Resolves a 1-based action choice against the most recent assistant
/// message that still has unconsumed action links.
fn pending_action<S, E>(
    controller: &ChatController<S, E>,
    choice: usize,
) -> Option<(ActionLink, MessageId)>
where
    S: AnswerService,
    E: ActionExecutor,
{
    let message = controller
        .transcript()
        .messages()
        .iter()
        .rev()
        .find(|m| m.has_pending_actions())?;
    let link = message.action_links.get(choice.checked_sub(1)?)?;
    Some((link.clone(), message.id))
}

/// Renders every message appended since the last call; returns the new
/// high-water mark.
fn render_from<W, S, E>(
    output: &mut W,
    controller: &ChatController<S, E>,
    from: usize,
) -> Result<usize>
where
    W: Write,
    S: AnswerService,
    E: ActionExecutor,
{
    let messages = controller.transcript().messages();
    for message in &messages[from..] {
        render_message(output, message)?;
    }
    Ok(messages.len())
}

fn render_message<W: Write>(output: &mut W, message: &Message) -> Result<()> {
    // User input is already on screen; only assistant turns are rendered.
    if message.role != Role::Assistant {
        return Ok(());
    }

    writeln!(output, "{AGENT_PREFIX}{}", message.content)?;

    if message.requires_human {
        writeln!(output, "  ● Connecting to human agent...")?;
    }

    if !message.sources.is_empty() {
        let refs: Vec<String> = message
            .sources
            .iter()
            .take(MAX_RENDERED_SOURCES)
            .map(|s| {
                format!(
                    "Ticket #{} ({:.0}%)",
                    s.ticket_id,
                    f64::from(s.similarity_score) * 100.0
                )
            })
            .collect();
        writeln!(output, "  sources: {}", refs.join(", "))?;
    }

    if message.has_pending_actions() {
        for (i, link) in message.action_links.iter().enumerate() {
            writeln!(output, "  [{}] {}", i + 1, link.label)?;
        }
        writeln!(output, "  (type a number to run an action)")?;
    }

    Ok(())
}
