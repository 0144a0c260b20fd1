//! Optional visual effects played where damage lands.
//!
//! Effects are doubly gated: the animation engine add-on and the effects
//! pack add-on must both be active, otherwise the workflow skips the
//! animation step entirely.

use crate::host::ModuleRegistry;
use crate::scene::TokenDocument;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Add-on that provides the effect playback engine.
pub const ANIMATION_ENGINE: &str = "sequencer";
/// Add-on that ships the effect assets.
pub const EFFECTS_PACK: &str = "smite-effects";

/// True when both add-ons required for playback are active.
pub fn animations_enabled(modules: &ModuleRegistry) -> bool {
    modules.is_active(ANIMATION_ENGINE) && modules.is_active(EFFECTS_PACK)
}

/// Parameters for one effect playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    /// Asset key inside the effects pack.
    pub file: String,
    /// Playback window in milliseconds.
    pub start_ms: u32,
    pub end_ms: u32,
    /// Fade-out duration in milliseconds.
    pub fade_out_ms: u32,
    pub scale: f32,
    pub random_rotation: bool,
}

impl EffectSpec {
    /// The default hit effect: a short red splatter at quarter scale.
    pub fn blood_splatter() -> Self {
        Self {
            file: "smite.effect.circle.blood.splatter.red".to_string(),
            start_ms: 0,
            end_ms: 450,
            fade_out_ms: 350,
            scale: 0.25,
            random_rotation: true,
        }
    }
}

/// Error from an animation sink.
#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("effect playback failed: {0}")]
    Playback(String),
}

/// Capability for playing an effect at a token's location.
#[async_trait]
pub trait AnimationSink: Send {
    async fn play(&mut self, spec: &EffectSpec, at: &TokenDocument) -> Result<(), AnimationError>;
}

/// Sink that records requested playbacks instead of rendering them.
///
/// Clones share the same log, so a test can keep one handle while the
/// workflow owns the other.
#[derive(Debug, Clone, Default)]
pub struct EffectRecorder {
    played: Arc<Mutex<Vec<PlayedEffect>>>,
}

/// One recorded playback request.
#[derive(Debug, Clone)]
pub struct PlayedEffect {
    pub token_name: String,
    pub file: String,
}

impl EffectRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<PlayedEffect> {
        self.played.lock().clone()
    }
}

#[async_trait]
impl AnimationSink for EffectRecorder {
    async fn play(&mut self, spec: &EffectSpec, at: &TokenDocument) -> Result<(), AnimationError> {
        tracing::debug!(token = %at.name, file = %spec.file, "effect played");
        self.played.lock().push(PlayedEffect {
            token_name: at.name.clone(),
            file: spec.file.clone(),
        });
        Ok(())
    }
}
