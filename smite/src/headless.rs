//! Headless mode: run one submission from CLI flags, no TUI.
//!
//! Useful for scripting encounters and for exercising the full flow in
//! automated tests.

use std::error::Error;
use std::path::PathBuf;

use rand::rngs::StdRng;

use smite_core::animation::{animations_enabled, EffectRecorder};
use smite_core::dice::RngRoller;
use smite_core::host::{Notifier, TracingNotifier};
use smite_core::workflow::SaveOutcome;
use smite_core::{ChatLog, DamageForm, DamageWorkflow, HostContext, Scene};

/// One submission assembled from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub roll: String,
    pub damage_type: Option<String>,
    pub save_dc: Option<String>,
    pub save_ability: Option<String>,
    /// Target token names; empty or `all` selects every token.
    pub targets: Vec<String>,
    pub write: bool,
}

/// Run one submission against the scene and print the transcript.
pub async fn run_headless(
    mut scene: Scene,
    scene_path: Option<PathBuf>,
    context: &HostContext,
    roller: RngRoller<StdRng>,
    submission: Submission,
) -> Result<(), Box<dyn Error>> {
    let mut notifier = TracingNotifier;

    let mut form = DamageForm::for_scene(&scene);
    form.roll_text = submission.roll;
    if let Some(key) = &submission.damage_type {
        form.damage_type = Some(key.parse()?);
    }
    if let Some(dc) = &submission.save_dc {
        form.save_dc_text = dc.clone();
    }
    if let Some(key) = &submission.save_ability {
        form.save_ability = Some(key.parse()?);
    }

    if submission.targets.is_empty() || submission.targets.iter().any(|t| t == "all") {
        form.select_all();
    } else {
        for name in &submission.targets {
            let id = form
                .choices()
                .iter()
                .find(|c| &c.name == name)
                .map(|c| c.id)
                .ok_or_else(|| format!("no token named '{name}' on the scene"))?;
            form.set_selected(id, true);
        }
    }

    let plan = match form.validate() {
        Ok(plan) => plan,
        Err(error) => {
            notifier.warn(&error.to_string());
            return Err(error.into());
        }
    };

    let effects = animations_enabled(&context.modules).then(EffectRecorder::new);
    let mut workflow = DamageWorkflow::new(roller, ChatLog::new());
    if let Some(recorder) = &effects {
        workflow = workflow.with_animation(Box::new(recorder.clone()));
    }

    let report = workflow.run(&mut scene, &plan).await?;

    println!("Damage roll: {}", report.roll);
    for message in workflow.messages().messages() {
        println!("{}", message.transcript_line());
    }
    for outcome in &report.outcomes {
        let save = match outcome.save {
            SaveOutcome::NotAttempted => "no save".to_string(),
            SaveOutcome::Succeeded { total, dc } => {
                format!("save {total} vs DC {dc}: halved")
            }
            SaveOutcome::Failed { total, dc } => {
                format!("save {total} vs DC {dc}: full damage")
            }
        };
        println!(
            "  {}: {} damage ({save}), {} HP left",
            outcome.token_name, outcome.damage, outcome.remaining_hp
        );
    }
    if let Some(recorder) = &effects {
        for effect in recorder.played() {
            println!("  effect played over {}", effect.token_name);
        }
    }

    if submission.write {
        if let Some(path) = scene_path {
            scene.save(&path).await?;
            println!("Scene written to {}", path.display());
        }
    }

    Ok(())
}
