//! Run a full damage application against the sample scene.

use smite_core::{Ability, ChatLog, DamageForm, DamageType, DamageWorkflow, RngRoller, Scene};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut scene = Scene::sample();
    println!("=== Scene: {} ===\n", scene.name);
    for token in scene.tokens() {
        println!(
            "  {} ({}/{} HP)",
            token.name, token.actor.hit_points.current, token.actor.hit_points.maximum
        );
    }

    let mut form = DamageForm::for_scene(&scene);
    form.roll_text = "8d6".to_string();
    form.damage_type = Some(DamageType::Fire);
    form.save_dc_text = "15".to_string();
    form.save_ability = Some(Ability::Dexterity);
    form.select_all();
    let plan = form.validate()?;

    println!("\nFireball! 8d6 fire, DC 15 Dexterity save for half.\n");

    let mut workflow = DamageWorkflow::new(RngRoller::new(), ChatLog::new());
    let report = workflow.run(&mut scene, &plan).await?;

    println!("Damage roll: {}\n", report.roll);
    for message in workflow.messages().messages() {
        println!("{}", message.transcript_line());
    }

    println!();
    for token in scene.tokens() {
        println!(
            "  {} ({}/{} HP)",
            token.name, token.actor.hit_points.current, token.actor.hit_points.maximum
        );
    }

    Ok(())
}
