//! The damage application flow.
//!
//! The damage roll is evaluated once and its total shared by every selected
//! token. Tokens are then processed strictly in sequence: saving throw,
//! chat message, damage mutation, optional effect, each step awaited before
//! the next token starts. There is no rollback: a failure mid-run leaves
//! earlier tokens damaged and later tokens untouched.

use crate::animation::{AnimationError, AnimationSink, EffectSpec};
use crate::chat::{ChatError, ChatMessage, MessageSink};
use crate::dice::{RollExpression, RollResult, Roller};
use crate::form::{DamagePlan, SavingThrow};
use crate::scene::{DamageInstance, Scene, TokenDocument, TokenId};
use thiserror::Error;

/// Errors from running the workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("token {0} is no longer on the scene")]
    UnknownToken(TokenId),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// How a token's saving throw went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No saving throw was configured; full damage applies.
    NotAttempted,
    /// Rolled below the DC; full damage applies.
    Failed { total: i32, dc: i32 },
    /// Rolled at or above the DC; damage is halved, rounded down.
    Succeeded { total: i32, dc: i32 },
}

impl SaveOutcome {
    /// Whether this outcome halves the shared damage total.
    pub fn halves_damage(&self) -> bool {
        matches!(self, SaveOutcome::Succeeded { .. })
    }
}

/// What happened to one token.
#[derive(Debug, Clone)]
pub struct TokenOutcome {
    pub token_id: TokenId,
    pub token_name: String,
    pub save: SaveOutcome,
    /// Damage actually requested for this token (after any halving).
    pub damage: i32,
    pub remaining_hp: i32,
    pub dropped: bool,
}

/// The full result of one submission.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The single shared damage roll.
    pub roll: RollResult,
    /// Per-token outcomes, in target order.
    pub outcomes: Vec<TokenOutcome>,
}

/// The damage workflow with its injected capabilities: a roller, a message
/// sink, and an optional animation sink (absent when the add-on gating
/// fails).
pub struct DamageWorkflow<R: Roller, M: MessageSink> {
    roller: R,
    messages: M,
    animation: Option<Box<dyn AnimationSink>>,
    effect: EffectSpec,
}

impl<R: Roller, M: MessageSink> DamageWorkflow<R, M> {
    pub fn new(roller: R, messages: M) -> Self {
        Self {
            roller,
            messages,
            animation: None,
            effect: EffectSpec::blood_splatter(),
        }
    }

    /// Attach an animation sink. Call only when [`crate::animation::animations_enabled`]
    /// holds for the active module registry.
    pub fn with_animation(mut self, sink: Box<dyn AnimationSink>) -> Self {
        self.animation = Some(sink);
        self
    }

    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effect = effect;
        self
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }

    /// Run a validated plan against the scene.
    pub async fn run(
        &mut self,
        scene: &mut Scene,
        plan: &DamagePlan,
    ) -> Result<RunReport, WorkflowError> {
        let roll = self.roller.roll(&plan.roll);
        tracing::debug!(
            notation = %plan.roll,
            total = roll.total,
            targets = plan.targets.len(),
            "damage roll evaluated"
        );

        let mut outcomes = Vec::with_capacity(plan.targets.len());
        for &id in &plan.targets {
            let token = scene
                .token_mut(id)
                .ok_or(WorkflowError::UnknownToken(id))?;

            let save = Self::resolve_save(&mut self.roller, token, plan.save);
            let mut damage = roll.total;
            if save.halves_damage() {
                damage = damage.div_euclid(2);
            }

            let flavor = format!(
                "{} takes {} {} damage!",
                token.name, damage, plan.damage_type
            );
            self.messages
                .post(ChatMessage::new(&token.name, flavor, roll.clone()))
                .await?;

            let report = token.actor.apply_damage(&[DamageInstance {
                damage_type: plan.damage_type,
                value: damage,
            }]);

            if let Some(sink) = self.animation.as_mut() {
                sink.play(&self.effect, token).await?;
            }

            tracing::info!(
                token = %token.name,
                damage,
                remaining = report.remaining,
                save = ?save,
                "damage applied"
            );

            outcomes.push(TokenOutcome {
                token_id: id,
                token_name: token.name.clone(),
                save,
                damage,
                remaining_hp: report.remaining,
                dropped: report.dropped,
            });
        }

        Ok(RunReport { roll, outcomes })
    }

    /// Resolve the optional saving throw for one token.
    ///
    /// A roll at or above the DC halves the damage; below it, full damage
    /// applies, as does the unconfigured case.
    fn resolve_save(
        roller: &mut R,
        token: &TokenDocument,
        save: Option<SavingThrow>,
    ) -> SaveOutcome {
        let Some(SavingThrow { dc, ability }) = save else {
            return SaveOutcome::NotAttempted;
        };

        let modifier = token.actor.saving_throw_modifier(ability);
        let roll = roller.roll(&RollExpression::d20_plus(modifier));
        tracing::debug!(
            token = %token.name,
            ability = %ability.key(),
            total = roll.total,
            dc,
            "saving throw rolled"
        );

        if roll.total >= dc {
            SaveOutcome::Succeeded {
                total: roll.total,
                dc,
            }
        } else {
            SaveOutcome::Failed {
                total: roll.total,
                dc,
            }
        }
    }
}
