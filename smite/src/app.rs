//! Dialog state and submit handling.

use smite_core::animation::EffectRecorder;
use smite_core::dice::RngRoller;
use smite_core::scene::{Ability, DamageType};
use smite_core::{ChatLog, DamageForm, DamageWorkflow, DialogSession, Scene};

use rand::rngs::StdRng;

/// The form fields focus cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Roll,
    DamageType,
    SaveDc,
    SaveAbility,
    Tokens,
}

impl Field {
    pub fn next(self) -> Field {
        match self {
            Field::Roll => Field::DamageType,
            Field::DamageType => Field::SaveDc,
            Field::SaveDc => Field::SaveAbility,
            Field::SaveAbility => Field::Tokens,
            Field::Tokens => Field::Roll,
        }
    }

    pub fn prev(self) -> Field {
        match self {
            Field::Roll => Field::Tokens,
            Field::DamageType => Field::Roll,
            Field::SaveDc => Field::DamageType,
            Field::SaveAbility => Field::SaveDc,
            Field::Tokens => Field::SaveAbility,
        }
    }
}

/// Main application state: the scene, the form over it, and the workflow
/// that runs on submit.
pub struct App {
    pub scene: Scene,
    pub form: DamageForm,
    pub focus: Field,
    pub token_cursor: usize,
    pub should_quit: bool,
    pub pending_submit: bool,
    /// Why the dialog closed, shown after the terminal is restored.
    pub close_reason: Option<String>,

    dialog: DialogSession,
    workflow: DamageWorkflow<RngRoller<StdRng>, ChatLog>,
    effects: Option<EffectRecorder>,
    status: Option<String>,
    chat_lines: Vec<String>,
    chat_seen: usize,
    effects_seen: usize,
}

impl App {
    pub fn new(
        scene: Scene,
        dialog: DialogSession,
        roller: RngRoller<StdRng>,
        effects: Option<EffectRecorder>,
    ) -> Self {
        let form = DamageForm::for_scene(&scene);
        let mut workflow = DamageWorkflow::new(roller, ChatLog::new());
        if let Some(recorder) = &effects {
            workflow = workflow.with_animation(Box::new(recorder.clone()));
        }

        Self {
            scene,
            form,
            focus: Field::default(),
            token_cursor: 0,
            should_quit: false,
            pending_submit: false,
            close_reason: None,
            dialog,
            workflow,
            effects,
            status: None,
            chat_lines: Vec::new(),
            chat_seen: 0,
            effects_seen: 0,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn chat_lines(&self) -> &[String] {
        &self.chat_lines
    }

    /// Poll the dialog lifecycle. A scene change force-closes the dialog.
    pub fn tick(&mut self) {
        if !self.dialog.poll() && !self.should_quit {
            self.close_reason = Some("Scene changed, damage dialog closed.".to_string());
            self.should_quit = true;
        }
    }

    /// Move the token cursor, clamped to the list.
    pub fn move_token_cursor(&mut self, delta: i32) {
        let len = self.form.choices().len();
        if len == 0 {
            return;
        }
        let current = self.token_cursor as i32;
        self.token_cursor = (current + delta).clamp(0, len as i32 - 1) as usize;
    }

    /// Toggle the checkbox under the cursor.
    pub fn toggle_current_token(&mut self) {
        if let Some(choice) = self.form.choices().get(self.token_cursor) {
            let id = choice.id;
            self.form.toggle(id);
        }
    }

    pub fn select_all_tokens(&mut self) {
        self.form.select_all();
    }

    /// Cycle the damage-type selector: blank, then each type in order.
    pub fn cycle_damage_type(&mut self, step: i32) {
        self.form.damage_type = cycle_option(self.form.damage_type, &DamageType::all(), step);
    }

    /// Cycle the ability selector: blank, then each ability in order.
    pub fn cycle_ability(&mut self, step: i32) {
        self.form.save_ability = cycle_option(self.form.save_ability, &Ability::all(), step);
    }

    pub fn type_char(&mut self, c: char) {
        match self.focus {
            Field::Roll => self.form.roll_text.push(c),
            Field::SaveDc => self.form.save_dc_text.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Roll => {
                self.form.roll_text.pop();
            }
            Field::SaveDc => {
                self.form.save_dc_text.pop();
            }
            _ => {}
        }
    }

    /// Validate and run the submission. On a validation failure the warning
    /// goes to the status line and the dialog stays open, form untouched.
    pub async fn submit(&mut self) {
        let plan = match self.form.validate() {
            Ok(plan) => plan,
            Err(error) => {
                self.set_status(error.to_string());
                return;
            }
        };

        match self.workflow.run(&mut self.scene, &plan).await {
            Ok(report) => {
                self.drain_transcript();
                self.form.refresh_hp(&self.scene);
                self.set_status(format!(
                    "Rolled {}, applied to {} token(s)",
                    report.roll,
                    report.outcomes.len()
                ));
            }
            Err(error) => {
                self.drain_transcript();
                self.form.refresh_hp(&self.scene);
                self.set_status(format!("Damage application failed: {error}"));
            }
        }
    }

    /// Copy newly posted chat messages and effect playbacks into the
    /// transcript pane.
    fn drain_transcript(&mut self) {
        let messages = self.workflow.messages().messages();
        for message in &messages[self.chat_seen..] {
            self.chat_lines.push(message.transcript_line());
        }
        self.chat_seen = messages.len();

        if let Some(recorder) = &self.effects {
            let played = recorder.played();
            for effect in &played[self.effects_seen..] {
                self.chat_lines
                    .push(format!("* an effect flares over {}", effect.token_name));
            }
            self.effects_seen = played.len();
        }
    }
}

/// Step an optional selection through `[blank, options...]`.
fn cycle_option<T: Copy + PartialEq>(current: Option<T>, options: &[T], step: i32) -> Option<T> {
    let len = options.len() as i32 + 1;
    let index = match current {
        None => 0,
        Some(value) => options.iter().position(|o| *o == value).map_or(0, |i| i as i32 + 1),
    };
    let next = (index + step).rem_euclid(len);
    if next == 0 {
        None
    } else {
        Some(options[(next - 1) as usize])
    }
}
