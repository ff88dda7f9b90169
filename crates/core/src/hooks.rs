//! Extension hook registration and dispatch.
//!
//! Optional rules modules augment the engine without it knowing their
//! internals: an activated extension registers callbacks for the hook points
//! it needs, and the engine dispatches at fixed points — as the last step of
//! validation, and before/after each phase. Hooks never mutate state
//! directly; a hook that wants to change state returns extra [`Action`]s,
//! which the engine runs through the normal validate/apply pipeline so the
//! history stays complete and replayable.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::{Action, RejectReason};
use crate::state::{GameState, TurnPhase};

/// Fixed points in a turn at which phase hooks fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseEvent {
    /// The game left the installation phase.
    GameStart,
    /// A turn phase was just entered, before its built-in actions run.
    Before(TurnPhase),
    /// A turn phase's built-in actions ran, before the phase closes.
    After(TurnPhase),
    /// Turn nine's cleanup completed.
    GameEnd,
}

/// One extension callback.
///
/// Both methods default to doing nothing, so an extension implements only
/// the hook points it registered for.
pub trait ExtensionHook: Send + Sync {
    /// Extension name, reported in `ExtensionVeto` rejections.
    fn name(&self) -> &'static str;

    /// Extra legality check, invoked after the structural checks pass.
    /// Returning `Err(reason)` vetoes the action.
    fn validate(&self, _state: &GameState, _action: &Action) -> Result<(), String> {
        Ok(())
    }

    /// Actions this extension contributes at a phase event.
    fn phase_actions(&self, _event: PhaseEvent, _state: &GameState) -> Vec<Action> {
        Vec::new()
    }
}

/// Ordered hook lists, keyed by typed event rather than by string.
///
/// Populated only for the extensions a game activated; an empty registry
/// dispatches to nobody.
#[derive(Clone, Default)]
pub struct HookRegistry {
    validators: Vec<Arc<dyn ExtensionHook>>,
    phase_hooks: BTreeMap<PhaseEvent, Vec<Arc<dyn ExtensionHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook to run as the last validation step of every action.
    pub fn register_validator(&mut self, hook: Arc<dyn ExtensionHook>) {
        self.validators.push(hook);
    }

    /// Registers a hook for one phase event. Hooks fire in registration
    /// order.
    pub fn register_phase(&mut self, event: PhaseEvent, hook: Arc<dyn ExtensionHook>) {
        self.phase_hooks.entry(event).or_default().push(hook);
    }

    /// Runs every validate hook; the first veto wins.
    pub fn dispatch_validate(
        &self,
        state: &GameState,
        action: &Action,
    ) -> Result<(), RejectReason> {
        for hook in &self.validators {
            if let Err(reason) = hook.validate(state, action) {
                return Err(RejectReason::ExtensionVeto {
                    extension: hook.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Collects the actions every hook registered for `event` contributes,
    /// in registration order.
    pub fn dispatch_phase(&self, event: PhaseEvent, state: &GameState) -> Vec<Action> {
        self.phase_hooks
            .get(&event)
            .into_iter()
            .flatten()
            .flat_map(|hook| hook.phase_actions(event, state))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty() && self.phase_hooks.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("validators", &self.validators.len())
            .field("phase_events", &self.phase_hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerId;

    struct VetoEverything;

    impl ExtensionHook for VetoEverything {
        fn name(&self) -> &'static str {
            "veto_everything"
        }

        fn validate(&self, _state: &GameState, _action: &Action) -> Result<(), String> {
            Err("no".to_string())
        }
    }

    #[test]
    fn empty_registry_vetoes_nothing() {
        let registry = HookRegistry::new();
        let state = GameState::new(vec![PlayerId(1)]);
        let action = Action::end_turn(PlayerId(1));
        assert!(registry.dispatch_validate(&state, &action).is_ok());
        assert!(registry.dispatch_phase(PhaseEvent::GameStart, &state).is_empty());
    }

    #[test]
    fn veto_names_the_extension() {
        let mut registry = HookRegistry::new();
        registry.register_validator(Arc::new(VetoEverything));
        let state = GameState::new(vec![PlayerId(1)]);
        let rejected = registry
            .dispatch_validate(&state, &Action::end_turn(PlayerId(1)))
            .unwrap_err();
        assert_eq!(
            rejected,
            RejectReason::ExtensionVeto {
                extension: "veto_everything".to_string(),
                reason: "no".to_string(),
            }
        );
    }
}
