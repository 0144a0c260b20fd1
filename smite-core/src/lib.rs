//! Scene-token damage engine for game masters.
//!
//! This crate provides:
//! - A dice notation parser and roller
//! - A scene/token/actor data model with JSON persistence
//! - A validated damage form and a sequential application workflow
//! - Capability traits for chat, animation, notification, and rolling,
//!   so hosts and tests inject their own implementations
//!
//! # Quick Start
//!
//! ```ignore
//! use smite_core::{ChatLog, DamageForm, DamageWorkflow, RngRoller, Scene};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = Scene::sample();
//!
//!     let mut form = DamageForm::for_scene(&scene);
//!     form.roll_text = "2d6+4".to_string();
//!     form.damage_type = Some(smite_core::DamageType::Fire);
//!     form.select_all();
//!
//!     let plan = form.validate()?;
//!     let mut workflow = DamageWorkflow::new(RngRoller::new(), ChatLog::new());
//!     let report = workflow.run(&mut scene, &plan).await?;
//!
//!     for outcome in &report.outcomes {
//!         println!("{}: {} damage", outcome.token_name, outcome.damage);
//!     }
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod chat;
pub mod dialog;
pub mod dice;
pub mod form;
pub mod host;
pub mod scene;
pub mod testing;
pub mod workflow;

// Primary public API
pub use animation::{animations_enabled, AnimationSink, EffectRecorder, EffectSpec};
pub use chat::{ChatLog, ChatMessage, MessageSink};
pub use dialog::{DialogSession, SceneFeed};
pub use dice::{RngRoller, RollExpression, RollResult, Roller};
pub use form::{DamageForm, DamagePlan, FormError, SavingThrow};
pub use host::{preflight, HostContext, Notifier, PreflightError, User};
pub use scene::{Ability, Actor, DamageType, Scene, TokenDocument, TokenId};
pub use workflow::{DamageWorkflow, RunReport, SaveOutcome, TokenOutcome, WorkflowError};
