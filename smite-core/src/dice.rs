//! Dice notation parsing and evaluation.
//!
//! Supports the damage-roll grammar the form accepts: one or more dice
//! terms and flat modifiers joined by `+`/`-`, e.g. `2d6+4` or `1d8+1d6-1`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest die the grammar accepts. Anything above this is a typo.
const MAX_SIDES: u32 = 1000;
/// Largest number of dice in a single term.
const MAX_COUNT: u32 = 100;

/// Error type for roll parsing.
#[derive(Debug, Error)]
pub enum RollError {
    #[error("empty roll notation")]
    Empty,
    #[error("unrecognized roll term: {0}")]
    BadTerm(String),
    #[error("die must have at least 2 sides (got d{0})")]
    TooFewSides(u32),
    #[error("die size d{0} exceeds the d{MAX_SIDES} limit")]
    TooManySides(u32),
    #[error("cannot roll zero dice (in {0})")]
    ZeroDice(String),
    #[error("cannot roll more than {MAX_COUNT} dice in one term (in {0})")]
    TooManyDice(String),
}

/// One additive term of a roll expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Term {
    /// `XdY`, with the sign of the surrounding `+`/`-`.
    Dice { count: u32, sides: u32, sign: i32 },
    /// A signed flat modifier.
    Flat(i32),
}

/// A parsed damage-roll expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollExpression {
    terms: Vec<Term>,
    notation: String,
}

impl RollExpression {
    /// Parse dice notation such as `2d6+4`.
    pub fn parse(notation: &str) -> Result<Self, RollError> {
        let trimmed = notation.trim().to_lowercase();
        if trimmed.is_empty() {
            return Err(RollError::Empty);
        }

        let mut terms = Vec::new();
        let mut chunk = String::new();
        let mut sign = 1i32;

        for ch in trimmed.chars() {
            match ch {
                '+' | '-' => {
                    terms.push(Self::parse_term(&chunk, sign)?);
                    chunk.clear();
                    sign = if ch == '+' { 1 } else { -1 };
                }
                c if c.is_whitespace() => continue,
                c => chunk.push(c),
            }
        }
        terms.push(Self::parse_term(&chunk, sign)?);

        Ok(Self {
            terms,
            notation: trimmed,
        })
    }

    /// Quick syntax check, used by the form before a submission is accepted.
    pub fn validate(notation: &str) -> bool {
        Self::parse(notation).is_ok()
    }

    /// A `1d20 + modifier` expression, as used for saving throws.
    pub fn d20_plus(modifier: i32) -> Self {
        let mut terms = vec![Term::Dice {
            count: 1,
            sides: 20,
            sign: 1,
        }];
        if modifier != 0 {
            terms.push(Term::Flat(modifier));
        }
        Self {
            notation: format!("1d20{modifier:+}"),
            terms,
        }
    }

    fn parse_term(chunk: &str, sign: i32) -> Result<Term, RollError> {
        if chunk.is_empty() {
            // A leading sign or doubled operator leaves an empty chunk.
            return Err(RollError::BadTerm(chunk.to_string()));
        }

        let Some((count_str, sides_str)) = chunk.split_once('d') else {
            let value: i32 = chunk
                .parse()
                .map_err(|_| RollError::BadTerm(chunk.to_string()))?;
            return Ok(Term::Flat(sign * value));
        };

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| RollError::BadTerm(chunk.to_string()))?
        };
        let sides: u32 = sides_str
            .parse()
            .map_err(|_| RollError::BadTerm(chunk.to_string()))?;

        if count == 0 {
            return Err(RollError::ZeroDice(chunk.to_string()));
        }
        if count > MAX_COUNT {
            return Err(RollError::TooManyDice(chunk.to_string()));
        }
        if sides < 2 {
            return Err(RollError::TooFewSides(sides));
        }
        if sides > MAX_SIDES {
            return Err(RollError::TooManySides(sides));
        }

        Ok(Term::Dice { count, sides, sign })
    }

    /// The normalized notation this expression was parsed from.
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// The additive terms of the expression.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

impl FromStr for RollExpression {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RollExpression::parse(s)
    }
}

impl fmt::Display for RollExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notation)
    }
}

/// The faces rolled for one dice term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRoll {
    pub sides: u32,
    pub sign: i32,
    pub faces: Vec<u32>,
}

impl TermRoll {
    pub fn subtotal(&self) -> i32 {
        self.sign * self.faces.iter().sum::<u32>() as i32
    }
}

/// Complete result of evaluating a roll expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub notation: String,
    pub term_rolls: Vec<TermRoll>,
    pub modifier: i32,
    pub total: i32,
}

impl RollResult {
    /// Human-readable breakdown, e.g. `[3, 5] + 4`.
    pub fn breakdown(&self) -> String {
        let mut parts: Vec<String> = self
            .term_rolls
            .iter()
            .map(|t| {
                let faces = t
                    .faces
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                if t.sign < 0 {
                    format!("-[{faces}]")
                } else {
                    format!("[{faces}]")
                }
            })
            .collect();
        if self.modifier != 0 || parts.is_empty() {
            parts.push(format!("{}", self.modifier));
        }
        parts.join(" + ").replace("+ -", "- ")
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.breakdown(), self.total)
    }
}

/// Capability that turns roll expressions into results.
///
/// The workflow takes a `Roller` rather than reaching for an ambient RNG so
/// tests can script exact totals.
pub trait Roller {
    fn roll(&mut self, expr: &RollExpression) -> RollResult;
}

/// The standard RNG-backed roller.
#[derive(Debug)]
pub struct RngRoller<R: Rng> {
    rng: R,
}

impl RngRoller<StdRng> {
    /// Roller seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic roller for tests and reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RngRoller<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RngRoller<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Roller for RngRoller<R> {
    fn roll(&mut self, expr: &RollExpression) -> RollResult {
        let mut term_rolls = Vec::new();
        let mut modifier = 0i32;

        for term in expr.terms() {
            match *term {
                Term::Dice { count, sides, sign } => {
                    let faces: Vec<u32> = (0..count)
                        .map(|_| self.rng.gen_range(1..=sides))
                        .collect();
                    term_rolls.push(TermRoll { sides, sign, faces });
                }
                Term::Flat(value) => modifier += value,
            }
        }

        let dice_total: i32 = term_rolls.iter().map(TermRoll::subtotal).sum();
        RollResult {
            notation: expr.notation().to_string(),
            term_rolls,
            modifier,
            total: dice_total + modifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let expr = RollExpression::parse("2d6+4").unwrap();
        assert_eq!(expr.terms().len(), 2);
        assert!(matches!(
            expr.terms()[0],
            Term::Dice {
                count: 2,
                sides: 6,
                sign: 1
            }
        ));
        assert!(matches!(expr.terms()[1], Term::Flat(4)));
    }

    #[test]
    fn parse_bare_die() {
        let expr = RollExpression::parse("d20").unwrap();
        assert!(matches!(
            expr.terms()[0],
            Term::Dice {
                count: 1,
                sides: 20,
                ..
            }
        ));
    }

    #[test]
    fn parse_mixed_terms() {
        let expr = RollExpression::parse("1d8 + 1d6 - 1").unwrap();
        assert_eq!(expr.terms().len(), 3);
        assert!(matches!(expr.terms()[2], Term::Flat(-1)));
    }

    #[test]
    fn parse_negative_dice_term() {
        let expr = RollExpression::parse("2d6-1d4").unwrap();
        assert!(matches!(expr.terms()[1], Term::Dice { sign: -1, .. }));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(RollExpression::parse("").is_err());
        assert!(RollExpression::parse("   ").is_err());
        assert!(RollExpression::parse("banana").is_err());
        assert!(RollExpression::parse("2d").is_err());
        assert!(RollExpression::parse("2d6++3").is_err());
        assert!(RollExpression::parse("0d6").is_err());
        assert!(RollExpression::parse("2d1").is_err());
        assert!(RollExpression::parse("1d5000").is_err());
    }

    #[test]
    fn validate_matches_parse() {
        assert!(RollExpression::validate("2d6+4"));
        assert!(!RollExpression::validate("not a roll"));
    }

    #[test]
    fn d20_plus_builds_save_expression() {
        let expr = RollExpression::d20_plus(3);
        assert_eq!(expr.notation(), "1d20+3");
        assert_eq!(expr.terms().len(), 2);

        let flat = RollExpression::d20_plus(0);
        assert_eq!(flat.terms().len(), 1);
    }

    #[test]
    fn roll_stays_in_range() {
        let expr = RollExpression::parse("1d20").unwrap();
        let mut roller = RngRoller::new();
        for _ in 0..100 {
            let result = roller.roll(&expr);
            assert!((1..=20).contains(&result.total));
        }
    }

    #[test]
    fn roll_applies_modifier() {
        let expr = RollExpression::parse("1d4+5").unwrap();
        let mut roller = RngRoller::new();
        for _ in 0..100 {
            let result = roller.roll(&expr);
            assert!((6..=9).contains(&result.total));
        }
    }

    #[test]
    fn seeded_roller_is_deterministic() {
        let expr = RollExpression::parse("2d6+4").unwrap();
        let a = RngRoller::seeded(7).roll(&expr);
        let b = RngRoller::seeded(7).roll(&expr);
        assert_eq!(a.total, b.total);
        assert_eq!(a.term_rolls[0].faces, b.term_rolls[0].faces);
    }

    #[test]
    fn breakdown_reads_naturally() {
        let result = RollResult {
            notation: "2d6+4".to_string(),
            term_rolls: vec![TermRoll {
                sides: 6,
                sign: 1,
                faces: vec![3, 5],
            }],
            modifier: 4,
            total: 12,
        };
        assert_eq!(result.breakdown(), "[3, 5] + 4");
        assert_eq!(result.to_string(), "[3, 5] + 4 = 12");
    }
}
