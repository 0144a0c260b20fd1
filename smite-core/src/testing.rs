//! Testing utilities: scripted rollers, failing sinks, recording notifiers,
//! and assertion helpers for verifying scene state.

use crate::chat::{ChatError, ChatMessage, MessageSink};
use crate::dice::{RollExpression, RollResult, Roller};
use crate::host::Notifier;
use crate::scene::Scene;
use async_trait::async_trait;
use std::collections::VecDeque;

/// A roller that returns scripted totals in order.
///
/// Once the script runs out it keeps returning the last total, so a test
/// that only cares about the damage roll doesn't have to script every save.
#[derive(Debug)]
pub struct ScriptedRoller {
    totals: VecDeque<i32>,
    last: i32,
}

impl ScriptedRoller {
    pub fn totals(totals: impl IntoIterator<Item = i32>) -> Self {
        Self {
            totals: totals.into_iter().collect(),
            last: 0,
        }
    }
}

impl Roller for ScriptedRoller {
    fn roll(&mut self, expr: &RollExpression) -> RollResult {
        if let Some(total) = self.totals.pop_front() {
            self.last = total;
        }
        let total = self.last;
        RollResult {
            notation: expr.notation().to_string(),
            term_rolls: Vec::new(),
            modifier: total,
            total,
        }
    }
}

/// A message sink that starts failing after a set number of posts.
///
/// Used to verify the no-rollback property: tokens processed before the
/// failure keep their damage, tokens after it are untouched.
#[derive(Debug, Default)]
pub struct FailingSink {
    delivered: Vec<ChatMessage>,
    accept: usize,
}

impl FailingSink {
    /// Accept `accept` posts, then fail every later one.
    pub fn accept(accept: usize) -> Self {
        Self {
            delivered: Vec::new(),
            accept,
        }
    }

    pub fn delivered(&self) -> &[ChatMessage] {
        &self.delivered
    }
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn post(&mut self, message: ChatMessage) -> Result<(), ChatError> {
        if self.delivered.len() >= self.accept {
            return Err(ChatError::Delivery("scripted failure".to_string()));
        }
        self.delivered.push(message);
        Ok(())
    }
}

/// A notifier that records every warning for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub warnings: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// Assert a named token's current hit points.
#[track_caller]
pub fn assert_token_hp(scene: &Scene, name: &str, expected: i32) {
    let token = scene
        .tokens()
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("no token named '{name}' on scene '{}'", scene.name));
    assert_eq!(
        token.actor.hit_points.current, expected,
        "expected {name} at {expected} HP, got {}",
        token.actor.hit_points.current
    );
}

/// Assert that no token on the scene has taken any damage.
#[track_caller]
pub fn assert_scene_untouched(scene: &Scene) {
    for token in scene.tokens() {
        assert_eq!(
            token.actor.hit_points.current, token.actor.hit_points.maximum,
            "expected {} untouched, got {}/{}",
            token.name, token.actor.hit_points.current, token.actor.hit_points.maximum
        );
    }
}
