//! Host environment: game system, invoking user, active add-ons.
//!
//! The damage tool refuses to run outside a D&D 5e game, for non-GM users,
//! and on empty scenes. All three checks happen before the form is shown.

use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// The only game system the damage rules apply to.
pub const REQUIRED_SYSTEM: &str = "dnd5e";

/// The invoking user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub gamemaster: bool,
}

impl User {
    pub fn gm(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gamemaster: true,
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gamemaster: false,
        }
    }
}

/// The set of active add-on modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRegistry {
    active: BTreeSet<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, id: impl Into<String>) {
        self.active.insert(id.into());
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }
}

/// Everything about the environment the tool was invoked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostContext {
    pub system_id: String,
    pub user: User,
    pub modules: ModuleRegistry,
}

impl HostContext {
    pub fn new(system_id: impl Into<String>, user: User) -> Self {
        Self {
            system_id: system_id.into(),
            user,
            modules: ModuleRegistry::new(),
        }
    }

    /// A D&D 5e context with a GM user, the common case for the binary.
    pub fn gamemaster(name: impl Into<String>) -> Self {
        Self::new(REQUIRED_SYSTEM, User::gm(name))
    }

    pub fn with_module(mut self, id: impl Into<String>) -> Self {
        self.modules.activate(id);
        self
    }
}

/// Entry preconditions that failed. Each maps to a user-visible warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreflightError {
    #[error("This tool only works with the D&D 5e system (active system: {found})")]
    WrongSystem { found: String },

    #[error("You do not have permission to use this tool")]
    NotGamemaster,

    #[error("There are no tokens on the scene")]
    EmptyScene,
}

/// Check every entry precondition. On failure nothing else runs: no form,
/// no rolls, no mutations.
pub fn preflight(context: &HostContext, scene: &Scene) -> Result<(), PreflightError> {
    if context.system_id != REQUIRED_SYSTEM {
        return Err(PreflightError::WrongSystem {
            found: context.system_id.clone(),
        });
    }
    if !context.user.gamemaster {
        return Err(PreflightError::NotGamemaster);
    }
    if scene.is_empty() {
        return Err(PreflightError::EmptyScene);
    }
    Ok(())
}

/// Capability for surfacing non-blocking, user-visible warnings.
pub trait Notifier {
    fn warn(&mut self, message: &str);
}

/// Notifier that forwards warnings to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Actor, TokenDocument};

    fn one_token_scene() -> Scene {
        let mut scene = Scene::new("Test");
        scene.place(TokenDocument::new(Actor::new("Goblin", 7)));
        scene
    }

    #[test]
    fn preflight_accepts_gm_on_populated_scene() {
        let context = HostContext::gamemaster("Alex");
        assert_eq!(preflight(&context, &one_token_scene()), Ok(()));
    }

    #[test]
    fn preflight_rejects_wrong_system() {
        let context = HostContext::new("pf2e", User::gm("Alex"));
        assert_eq!(
            preflight(&context, &one_token_scene()),
            Err(PreflightError::WrongSystem {
                found: "pf2e".to_string()
            })
        );
    }

    #[test]
    fn preflight_rejects_players() {
        let context = HostContext::new(REQUIRED_SYSTEM, User::player("Sam"));
        assert_eq!(
            preflight(&context, &one_token_scene()),
            Err(PreflightError::NotGamemaster)
        );
    }

    #[test]
    fn preflight_rejects_empty_scene() {
        let context = HostContext::gamemaster("Alex");
        assert_eq!(
            preflight(&context, &Scene::new("Empty")),
            Err(PreflightError::EmptyScene)
        );
    }

    #[test]
    fn module_registry_tracks_activation() {
        let mut modules = ModuleRegistry::new();
        assert!(!modules.is_active("sequencer"));
        modules.activate("sequencer");
        assert!(modules.is_active("sequencer"));
    }
}
