//! Scene and token data model.
//!
//! A [`Scene`] owns the tokens a game master can target. Each token links to
//! an [`Actor`] holding hit points and saving-throw modifiers. Scenes load
//! and save as JSON so the tool can be pointed at any encounter file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Unique identifier for a token on a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six ability scores a saving throw can key off.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// Short key used in form fields and chat text (`dex`, `con`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl FromStr for Ability {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Ability::all()
            .into_iter()
            .find(|a| a.key() == needle || a.label().to_lowercase() == needle)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The damage types an attack can deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Force,
    Psychic,
}

impl DamageType {
    pub fn key(&self) -> &'static str {
        match self {
            DamageType::Slashing => "slashing",
            DamageType::Piercing => "piercing",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Thunder => "thunder",
            DamageType::Acid => "acid",
            DamageType::Poison => "poison",
            DamageType::Necrotic => "necrotic",
            DamageType::Radiant => "radiant",
            DamageType::Force => "force",
            DamageType::Psychic => "psychic",
        }
    }

    pub fn label(&self) -> String {
        let key = self.key();
        let mut label = String::with_capacity(key.len());
        let mut chars = key.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
        }
        label.extend(chars);
        label
    }

    pub fn all() -> [DamageType; 13] {
        [
            DamageType::Slashing,
            DamageType::Piercing,
            DamageType::Bludgeoning,
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Lightning,
            DamageType::Thunder,
            DamageType::Acid,
            DamageType::Poison,
            DamageType::Necrotic,
            DamageType::Radiant,
            DamageType::Force,
            DamageType::Psychic,
        ]
    }
}

impl FromStr for DamageType {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        DamageType::all()
            .into_iter()
            .find(|d| d.key() == needle)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Error for string lookups of abilities and damage types.
#[derive(Debug, Error)]
#[error("unknown key: {0}")]
pub struct UnknownKey(pub String);

/// Hit point tracking for an actor. Current never exceeds maximum and never
/// drops below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub maximum: i32,
}

impl HitPoints {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Apply damage, flooring at zero. Negative amounts heal, capped at max.
    pub fn take_damage(&mut self, amount: i32) -> DamageReport {
        let before = self.current;
        self.current = (self.current - amount).clamp(0, self.maximum);
        DamageReport {
            taken: before - self.current,
            remaining: self.current,
            dropped: before > 0 && self.current == 0,
        }
    }

    pub fn is_down(&self) -> bool {
        self.current == 0
    }
}

/// What a damage application did to a hit point pool.
#[derive(Debug, Clone, Copy)]
pub struct DamageReport {
    pub taken: i32,
    pub remaining: i32,
    pub dropped: bool,
}

/// One typed component of a damage application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageInstance {
    pub damage_type: DamageType,
    pub value: i32,
}

/// The creature record behind a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Portrait image path, shown next to the token's checkbox row.
    pub img: String,
    pub hit_points: HitPoints,
    /// Saving-throw modifiers; abilities not listed default to +0.
    #[serde(default)]
    pub save_modifiers: BTreeMap<Ability, i32>,
}

impl Actor {
    pub fn new(name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            name: name.into(),
            img: String::new(),
            hit_points: HitPoints::new(max_hp),
            save_modifiers: BTreeMap::new(),
        }
    }

    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = img.into();
        self
    }

    pub fn with_save_modifier(mut self, ability: Ability, modifier: i32) -> Self {
        self.save_modifiers.insert(ability, modifier);
        self
    }

    pub fn saving_throw_modifier(&self, ability: Ability) -> i32 {
        self.save_modifiers.get(&ability).copied().unwrap_or(0)
    }

    /// Apply a batch of typed damage in one mutating call.
    pub fn apply_damage(&mut self, parts: &[DamageInstance]) -> DamageReport {
        let total: i32 = parts.iter().map(|p| p.value).sum();
        self.hit_points.take_damage(total)
    }
}

/// An on-scene representation of an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDocument {
    pub id: TokenId,
    pub name: String,
    pub actor: Actor,
}

impl TokenDocument {
    pub fn new(actor: Actor) -> Self {
        Self {
            id: TokenId::new(),
            name: actor.name.clone(),
            actor,
        }
    }
}

/// Errors from scene persistence and lookup.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A scene: the set of tokens currently on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    tokens: Vec<TokenDocument>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: Vec::new(),
        }
    }

    /// Add a token. Ids are unique by construction (uuid v4).
    pub fn place(&mut self, token: TokenDocument) -> TokenId {
        let id = token.id;
        self.tokens.push(token);
        id
    }

    pub fn tokens(&self) -> &[TokenDocument] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> Option<&TokenDocument> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut TokenDocument> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Load a scene from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the scene to a JSON file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// A small demo encounter, used when no scene file is given.
    pub fn sample() -> Self {
        let mut scene = Scene::new("Roadside Ambush");
        scene.place(TokenDocument::new(
            Actor::new("Goblin Skirmisher", 7)
                .with_img("portraits/goblin.png")
                .with_save_modifier(Ability::Dexterity, 2)
                .with_save_modifier(Ability::Strength, -1),
        ));
        scene.place(TokenDocument::new(
            Actor::new("Ogre Brute", 59)
                .with_img("portraits/ogre.png")
                .with_save_modifier(Ability::Strength, 4)
                .with_save_modifier(Ability::Dexterity, -1),
        ));
        scene.place(TokenDocument::new(
            Actor::new("Bandit Captain", 65)
                .with_img("portraits/bandit-captain.png")
                .with_save_modifier(Ability::Dexterity, 5)
                .with_save_modifier(Ability::Wisdom, 2),
        ));
        scene
    }
}
