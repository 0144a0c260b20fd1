//! The damage form: what the dialog renders and what validation produces.
//!
//! Token selection is a typed map built explicitly from the scene, one entry
//! per token in scene order. Validation checks every rule before any side
//! effect occurs; a failed check leaves the form untouched so the dialog can
//! stay open for correction.

use crate::dice::{RollError, RollExpression};
use crate::scene::{Ability, DamageType, Scene, TokenId};
use thiserror::Error;

/// One selectable token row on the form.
#[derive(Debug, Clone)]
pub struct TokenChoice {
    pub id: TokenId,
    pub name: String,
    pub portrait: String,
    pub hp_current: i32,
    pub hp_maximum: i32,
    pub selected: bool,
}

/// The editable state of the damage dialog.
#[derive(Debug, Clone, Default)]
pub struct DamageForm {
    /// Free-text dice notation, e.g. `2d6+4`.
    pub roll_text: String,
    pub damage_type: Option<DamageType>,
    /// Free-text saving-throw DC; empty means no saving throw.
    pub save_dc_text: String,
    pub save_ability: Option<Ability>,
    choices: Vec<TokenChoice>,
}

/// A validation failure. The message is the warning shown to the user.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Damage Roll cannot be empty!")]
    EmptyRoll,

    #[error("Enter a valid roll!")]
    InvalidRoll(#[source] RollError),

    #[error("Damage Type must be selected!")]
    MissingDamageType,

    #[error("At least one token must be selected!")]
    NoTokenSelected,

    #[error("Please add a Saving Throw DC!")]
    MissingDc,

    #[error("Please choose a Saving Throw Ability!")]
    MissingAbility,

    #[error("Saving Throw DC must be a number!")]
    InvalidDc,
}

/// A configured saving throw: targets roll against this DC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingThrow {
    pub dc: i32,
    pub ability: Ability,
}

/// The validated product of a form submission.
#[derive(Debug, Clone)]
pub struct DamagePlan {
    pub roll: RollExpression,
    pub damage_type: DamageType,
    pub save: Option<SavingThrow>,
    /// Selected tokens, in scene order. Never empty.
    pub targets: Vec<TokenId>,
}

impl DamageForm {
    /// Build a form for the given scene: one unchecked row per token.
    pub fn for_scene(scene: &Scene) -> Self {
        let choices = scene
            .tokens()
            .iter()
            .map(|token| TokenChoice {
                id: token.id,
                name: token.name.clone(),
                portrait: token.actor.img.clone(),
                hp_current: token.actor.hit_points.current,
                hp_maximum: token.actor.hit_points.maximum,
                selected: false,
            })
            .collect();

        Self {
            choices,
            ..Self::default()
        }
    }

    pub fn choices(&self) -> &[TokenChoice] {
        &self.choices
    }

    /// Toggle a token's checkbox. Unknown ids are ignored.
    pub fn toggle(&mut self, id: TokenId) {
        if let Some(choice) = self.choices.iter_mut().find(|c| c.id == id) {
            choice.selected = !choice.selected;
        }
    }

    pub fn set_selected(&mut self, id: TokenId, selected: bool) {
        if let Some(choice) = self.choices.iter_mut().find(|c| c.id == id) {
            choice.selected = selected;
        }
    }

    pub fn select_all(&mut self) {
        for choice in &mut self.choices {
            choice.selected = true;
        }
    }

    /// Refresh HP columns after damage lands, so a dialog that stays open
    /// shows current numbers.
    pub fn refresh_hp(&mut self, scene: &Scene) {
        for choice in &mut self.choices {
            if let Some(token) = scene.token(choice.id) {
                choice.hp_current = token.actor.hit_points.current;
                choice.hp_maximum = token.actor.hit_points.maximum;
            }
        }
    }

    /// Validate the submission. All rules pass before any side effect.
    pub fn validate(&self) -> Result<DamagePlan, FormError> {
        let roll_text = self.roll_text.trim();
        if roll_text.is_empty() {
            return Err(FormError::EmptyRoll);
        }
        let roll = RollExpression::parse(roll_text).map_err(FormError::InvalidRoll)?;

        let damage_type = self.damage_type.ok_or(FormError::MissingDamageType)?;

        let targets: Vec<TokenId> = self
            .choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect();
        if targets.is_empty() {
            return Err(FormError::NoTokenSelected);
        }

        let dc_text = self.save_dc_text.trim();
        let save = match (dc_text.is_empty(), self.save_ability) {
            (true, None) => None,
            (false, None) => return Err(FormError::MissingAbility),
            (true, Some(_)) => return Err(FormError::MissingDc),
            (false, Some(ability)) => {
                let dc: i32 = dc_text.parse().map_err(|_| FormError::InvalidDc)?;
                Some(SavingThrow { dc, ability })
            }
        };

        Ok(DamagePlan {
            roll,
            damage_type,
            save,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Actor, TokenDocument};

    fn scene() -> Scene {
        let mut scene = Scene::new("Test");
        scene.place(TokenDocument::new(Actor::new("Goblin", 7)));
        scene.place(TokenDocument::new(Actor::new("Ogre", 59)));
        scene
    }

    fn filled_form(scene: &Scene) -> DamageForm {
        let mut form = DamageForm::for_scene(scene);
        form.roll_text = "2d6+4".to_string();
        form.damage_type = Some(DamageType::Fire);
        form.toggle(scene.tokens()[0].id);
        form
    }

    #[test]
    fn form_mirrors_scene_order() {
        let scene = scene();
        let form = DamageForm::for_scene(&scene);
        assert_eq!(form.choices().len(), 2);
        assert_eq!(form.choices()[0].name, "Goblin");
        assert_eq!(form.choices()[0].hp_maximum, 7);
        assert!(!form.choices()[0].selected);
    }

    #[test]
    fn valid_submission_produces_plan() {
        let scene = scene();
        let plan = filled_form(&scene).validate().unwrap();
        assert_eq!(plan.roll.notation(), "2d6+4");
        assert_eq!(plan.damage_type, DamageType::Fire);
        assert!(plan.save.is_none());
        assert_eq!(plan.targets, vec![scene.tokens()[0].id]);
    }

    #[test]
    fn empty_roll_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.roll_text = "   ".to_string();
        assert!(matches!(form.validate(), Err(FormError::EmptyRoll)));
    }

    #[test]
    fn invalid_roll_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.roll_text = "2x6".to_string();
        assert!(matches!(form.validate(), Err(FormError::InvalidRoll(_))));
    }

    #[test]
    fn missing_damage_type_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.damage_type = None;
        assert!(matches!(form.validate(), Err(FormError::MissingDamageType)));
    }

    #[test]
    fn no_selection_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.toggle(scene.tokens()[0].id); // uncheck the only selection
        assert!(matches!(form.validate(), Err(FormError::NoTokenSelected)));
    }

    #[test]
    fn lone_dc_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.save_dc_text = "15".to_string();
        assert!(matches!(form.validate(), Err(FormError::MissingAbility)));
    }

    #[test]
    fn lone_ability_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.save_ability = Some(Ability::Dexterity);
        assert!(matches!(form.validate(), Err(FormError::MissingDc)));
    }

    #[test]
    fn non_numeric_dc_is_rejected() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.save_dc_text = "fifteen".to_string();
        form.save_ability = Some(Ability::Dexterity);
        assert!(matches!(form.validate(), Err(FormError::InvalidDc)));
    }

    #[test]
    fn configured_save_lands_in_plan() {
        let scene = scene();
        let mut form = filled_form(&scene);
        form.save_dc_text = " 15 ".to_string();
        form.save_ability = Some(Ability::Dexterity);
        let plan = form.validate().unwrap();
        assert_eq!(
            plan.save,
            Some(SavingThrow {
                dc: 15,
                ability: Ability::Dexterity
            })
        );
    }

    #[test]
    fn select_all_and_refresh_hp() {
        let mut scene = scene();
        let mut form = DamageForm::for_scene(&scene);
        form.select_all();
        assert!(form.choices().iter().all(|c| c.selected));

        let id = scene.tokens()[0].id;
        scene
            .token_mut(id)
            .unwrap()
            .actor
            .hit_points
            .take_damage(3);
        form.refresh_hp(&scene);
        assert_eq!(form.choices()[0].hp_current, 4);
    }
}
