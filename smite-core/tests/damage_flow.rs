//! End-to-end tests for the damage application flow: preflight, form
//! validation, shared rolls, saving throws, chat, animation gating, and the
//! no-rollback failure behavior.

use smite_core::animation::{animations_enabled, EffectRecorder, ANIMATION_ENGINE, EFFECTS_PACK};
use smite_core::testing::{assert_scene_untouched, assert_token_hp, FailingSink, ScriptedRoller};
use smite_core::{
    preflight, Ability, Actor, ChatLog, DamageForm, DamageType, DamageWorkflow, HostContext,
    PreflightError, RngRoller, Scene, SceneFeed, TokenDocument, User,
};

fn ambush_scene() -> Scene {
    let mut scene = Scene::new("Roadside Ambush");
    scene.place(TokenDocument::new(
        Actor::new("Goblin", 30).with_save_modifier(Ability::Dexterity, 2),
    ));
    scene.place(TokenDocument::new(
        Actor::new("Ogre", 59).with_save_modifier(Ability::Dexterity, -1),
    ));
    scene
}

fn filled_form(scene: &Scene) -> DamageForm {
    let mut form = DamageForm::for_scene(scene);
    form.roll_text = "2d6+4".to_string();
    form.damage_type = Some(DamageType::Fire);
    form.select_all();
    form
}

#[tokio::test]
async fn two_tokens_no_save_take_full_shared_roll() {
    let mut scene = ambush_scene();
    let plan = filled_form(&scene).validate().unwrap();

    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([11]), ChatLog::new());
    let report = workflow.run(&mut scene, &plan).await.unwrap();

    assert_eq!(report.roll.total, 11);
    assert_token_hp(&scene, "Goblin", 19);
    assert_token_hp(&scene, "Ogre", 48);

    // One chat message per affected token.
    let messages = workflow.messages().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].flavor, "Goblin takes 11 fire damage!");
    assert_eq!(messages[1].flavor, "Ogre takes 11 fire damage!");
}

#[tokio::test]
async fn save_results_split_full_and_half_damage() {
    let mut scene = ambush_scene();
    let mut form = filled_form(&scene);
    form.save_dc_text = "15".to_string();
    form.save_ability = Some(Ability::Dexterity);
    let plan = form.validate().unwrap();

    // Shared damage roll 11; Goblin save total 16 (halved to 5),
    // Ogre save total 14 (full 11).
    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([11, 16, 14]), ChatLog::new());
    let report = workflow.run(&mut scene, &plan).await.unwrap();

    assert_eq!(report.outcomes[0].damage, 5);
    assert_eq!(report.outcomes[1].damage, 11);
    assert_token_hp(&scene, "Goblin", 25);
    assert_token_hp(&scene, "Ogre", 48);
}

#[tokio::test]
async fn halving_rounds_down() {
    let mut scene = ambush_scene();
    let mut form = filled_form(&scene);
    form.save_dc_text = "10".to_string();
    form.save_ability = Some(Ability::Dexterity);
    let plan = form.validate().unwrap();

    // Odd total 7; both saves succeed; floor(7 / 2) = 3.
    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([7, 18, 12]), ChatLog::new());
    let report = workflow.run(&mut scene, &plan).await.unwrap();

    assert_eq!(report.outcomes[0].damage, 3);
    assert_eq!(report.outcomes[1].damage, 3);
}

#[tokio::test]
async fn seeded_roll_is_shared_not_rerolled_per_token() {
    let mut scene = ambush_scene();
    let plan = filled_form(&scene).validate().unwrap();

    let mut workflow = DamageWorkflow::new(RngRoller::seeded(42), ChatLog::new());
    let report = workflow.run(&mut scene, &plan).await.unwrap();

    let total = report.roll.total;
    assert!((6..=16).contains(&total));
    for outcome in &report.outcomes {
        assert_eq!(outcome.damage, total);
    }
    assert_token_hp(&scene, "Goblin", 30 - total);
    assert_token_hp(&scene, "Ogre", 59 - total);
}

#[tokio::test]
async fn validation_failures_apply_no_damage() {
    let scene = ambush_scene();

    // Empty roll.
    let mut form = DamageForm::for_scene(&scene);
    form.damage_type = Some(DamageType::Fire);
    form.select_all();
    assert!(form.validate().is_err());

    // Missing damage type.
    let mut form = filled_form(&scene);
    form.damage_type = None;
    assert!(form.validate().is_err());

    // Nothing selected.
    let mut form = filled_form(&scene);
    for choice in form.choices().to_vec() {
        form.set_selected(choice.id, false);
    }
    assert!(form.validate().is_err());

    // DC without ability, ability without DC.
    let mut form = filled_form(&scene);
    form.save_dc_text = "15".to_string();
    assert!(form.validate().is_err());
    let mut form = filled_form(&scene);
    form.save_ability = Some(Ability::Dexterity);
    assert!(form.validate().is_err());

    // No validate() call above produced a plan, so nothing ran.
    assert_scene_untouched(&scene);
}

#[tokio::test]
async fn preflight_gates_the_whole_flow() {
    let scene = ambush_scene();

    let wrong_system = HostContext::new("pf2e", User::gm("Alex"));
    assert!(matches!(
        preflight(&wrong_system, &scene),
        Err(PreflightError::WrongSystem { .. })
    ));

    let player = HostContext::new("dnd5e", User::player("Sam"));
    assert_eq!(preflight(&player, &scene), Err(PreflightError::NotGamemaster));

    let gm = HostContext::gamemaster("Alex");
    assert_eq!(preflight(&gm, &Scene::new("Empty")), Err(PreflightError::EmptyScene));
    assert_eq!(preflight(&gm, &scene), Ok(()));
    assert_scene_untouched(&scene);
}

#[tokio::test]
async fn animation_plays_per_token_only_when_both_add_ons_active() {
    let context = HostContext::gamemaster("Alex")
        .with_module(ANIMATION_ENGINE)
        .with_module(EFFECTS_PACK);
    assert!(animations_enabled(&context.modules));

    let partial = HostContext::gamemaster("Alex").with_module(ANIMATION_ENGINE);
    assert!(!animations_enabled(&partial.modules));

    let mut scene = ambush_scene();
    let plan = filled_form(&scene).validate().unwrap();
    let recorder = EffectRecorder::new();
    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([9]), ChatLog::new())
        .with_animation(Box::new(recorder.clone()));

    workflow.run(&mut scene, &plan).await.unwrap();

    // Zero or one playback per affected token; here, one each.
    let played = recorder.played();
    assert_eq!(played.len(), 2);
    assert_eq!(played[0].token_name, "Goblin");
    assert_eq!(played[1].token_name, "Ogre");
}

#[tokio::test]
async fn dialog_survives_submits_but_not_scene_changes() {
    let mut scene = ambush_scene();
    let feed = SceneFeed::new();
    let mut dialog = feed.open_dialog();

    // A submission runs without closing the dialog, and the form refreshes
    // to show post-damage HP.
    let mut form = filled_form(&scene);
    let plan = form.validate().unwrap();
    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([11]), ChatLog::new());
    workflow.run(&mut scene, &plan).await.unwrap();
    form.refresh_hp(&scene);

    assert!(dialog.poll());
    assert_eq!(form.choices()[0].hp_current, 19);

    // A scene change force-closes it.
    feed.scene_changed("Dungeon Level 2");
    assert!(!dialog.poll());
    assert!(!dialog.is_open());
}

#[tokio::test]
async fn mid_run_failure_keeps_earlier_damage_without_rollback() {
    let mut scene = ambush_scene();
    let plan = filled_form(&scene).validate().unwrap();

    // The sink accepts the Goblin's message and fails on the Ogre's.
    let mut workflow = DamageWorkflow::new(ScriptedRoller::totals([11]), FailingSink::accept(1));
    let result = workflow.run(&mut scene, &plan).await;

    assert!(result.is_err());
    // Goblin was fully processed before the failure; Ogre never was.
    assert_token_hp(&scene, "Goblin", 19);
    assert_token_hp(&scene, "Ogre", 59);
    assert_eq!(workflow.messages().delivered().len(), 1);
}
