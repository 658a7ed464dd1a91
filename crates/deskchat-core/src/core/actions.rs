//! Action execution profiles and the execution seam.
//!
//! An assistant reply can propose follow-up actions; each action's
//! user-visible lifecycle is described by an [`ActionProfile`] (processing
//! line, outcome line, duration). Profiles live in an [`ActionRegistry`]
//! injected into the controller, and the actual execution happens behind the
//! [`ActionExecutor`] trait so a real backend dispatcher can replace the
//! shipped simulation without touching the state machine.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::config::ActionProfileConfig;
use crate::core::session::ActionLink;
use crate::services::ServiceResult;

/// Outcome line used when an action has no registered profile.
pub const DEFAULT_OUTCOME_TEXT: &str = "✓ Action completed successfully.";

const DEFAULT_PROCESSING_TEXT: &str = "Working on that for you...";
const DEFAULT_DURATION_MS: u64 = 1200;

/// Processing/outcome message pair and duration for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionProfile {
    /// Shown in the placeholder while the action runs.
    pub processing_text: String,
    /// Replaces the placeholder content when the action completes.
    pub outcome_text: String,
    /// How long the simulated execution takes.
    pub duration: Duration,
}

impl Default for ActionProfile {
    fn default() -> Self {
        Self {
            processing_text: DEFAULT_PROCESSING_TEXT.to_string(),
            outcome_text: DEFAULT_OUTCOME_TEXT.to_string(),
            duration: Duration::from_millis(DEFAULT_DURATION_MS),
        }
    }
}

impl ActionProfile {
    /// Applies a config override on top of this profile.
    fn with_overrides(mut self, overrides: &ActionProfileConfig) -> Self {
        if let Some(processing_text) = &overrides.processing_text {
            self.processing_text.clone_from(processing_text);
        }
        if let Some(outcome_text) = &overrides.outcome_text {
            self.outcome_text.clone_from(outcome_text);
        }
        if let Some(duration_ms) = overrides.duration_ms {
            self.duration = Duration::from_millis(duration_ms);
        }
        self
    }
}

/// Registry mapping tool identifiers to execution profiles.
///
/// Lookups cannot fail: an unknown identifier resolves to the fallback
/// profile, so the two-phase flow always has texts to show.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    profiles: HashMap<String, ActionProfile>,
    fallback: ActionProfile,
}

impl ActionRegistry {
    /// Creates a registry with no named profiles and the default fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the `[actions.<tool_call>]` config sections.
    pub fn from_config(overrides: &HashMap<String, ActionProfileConfig>) -> Self {
        let mut registry = Self::new();
        for (tool_call, profile_config) in overrides {
            registry.register(
                tool_call.clone(),
                ActionProfile::default().with_overrides(profile_config),
            );
        }
        registry
    }

    pub fn register(&mut self, tool_call: impl Into<String>, profile: ActionProfile) {
        self.profiles.insert(tool_call.into(), profile);
    }

    #[must_use]
    pub fn with_profile(mut self, tool_call: impl Into<String>, profile: ActionProfile) -> Self {
        self.register(tool_call, profile);
        self
    }

    /// Looks up the profile for a tool identifier, falling back to the
    /// default profile for unregistered identifiers.
    pub fn profile(&self, tool_call: &str) -> &ActionProfile {
        self.profiles.get(tool_call).unwrap_or(&self.fallback)
    }

    pub fn is_registered(&self, tool_call: &str) -> bool {
        self.profiles.contains_key(tool_call)
    }
}

/// Execution seam for triggered actions.
///
/// The controller awaits this between appending the processing placeholder
/// and patching in the outcome. Implementations must not mutate session
/// state; they only report success or failure.
pub trait ActionExecutor: Send + Sync {
    fn execute(
        &self,
        link: &ActionLink,
        profile: &ActionProfile,
    ) -> impl Future<Output = ServiceResult<()>> + Send;
}

/// Executor that stands in for a real action backend with a bounded delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExecutor;

impl ActionExecutor for SimulatedExecutor {
    fn execute(
        &self,
        _link: &ActionLink,
        profile: &ActionProfile,
    ) -> impl Future<Output = ServiceResult<()>> + Send {
        let duration = profile.duration;
        async move {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(tool_call: &str) -> ActionLink {
        ActionLink {
            label: "Do it".to_string(),
            tool_call: tool_call.to_string(),
            is_tool_action: true,
        }
    }

    #[test]
    fn test_unknown_identifier_falls_back_to_default() {
        let registry = ActionRegistry::new();
        let profile = registry.profile("createServiceNowTicket");
        assert_eq!(profile.outcome_text, DEFAULT_OUTCOME_TEXT);
        assert!(!registry.is_registered("createServiceNowTicket"));
    }

    #[test]
    fn test_registered_profile_wins() {
        let registry = ActionRegistry::new().with_profile(
            "redirectToHuman",
            ActionProfile {
                processing_text: "Connecting you with a human agent...".to_string(),
                outcome_text: "✓ You're in the queue.".to_string(),
                duration: Duration::from_millis(800),
            },
        );

        let profile = registry.profile("redirectToHuman");
        assert_eq!(profile.outcome_text, "✓ You're in the queue.");
        assert_eq!(profile.duration, Duration::from_millis(800));
    }

    #[test]
    fn test_from_config_applies_partial_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "createServiceNowTicket".to_string(),
            ActionProfileConfig {
                outcome_text: Some("✓ Ticket created.".to_string()),
                ..ActionProfileConfig::default()
            },
        );

        let registry = ActionRegistry::from_config(&overrides);
        let profile = registry.profile("createServiceNowTicket");
        // Overridden field takes, the rest keeps the default profile.
        assert_eq!(profile.outcome_text, "✓ Ticket created.");
        assert_eq!(profile.processing_text, DEFAULT_PROCESSING_TEXT);
        assert_eq!(profile.duration, Duration::from_millis(DEFAULT_DURATION_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_executor_waits_the_profile_duration() {
        let profile = ActionProfile {
            duration: Duration::from_millis(500),
            ..ActionProfile::default()
        };
        let start = tokio::time::Instant::now();
        SimulatedExecutor
            .execute(&link("anything"), &profile)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
