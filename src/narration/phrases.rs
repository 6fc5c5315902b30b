//! Announcement phrases
//!
//! Builds what gets said for a drawn number: the primary call and the
//! optional repetition that follows it.

use crate::pool::Category;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause before the repetition of a single-digit number
pub const SINGLE_DIGIT_PAUSE: Duration = Duration::from_millis(1500);

/// Pause before the repetition of any other number
pub const MULTI_DIGIT_PAUSE: Duration = Duration::from_millis(400);

const DIGIT_WORDS: [&str; 10] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve",
];

/// How a call is repeated after the primary announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Spell the number digit by digit
    #[default]
    #[serde(rename = "digits")]
    SpellDigits,
    /// Say the whole call again
    #[serde(rename = "number")]
    RepeatNumber,
    #[serde(rename = "none")]
    Off,
}

impl RepeatMode {
    pub fn id(&self) -> &'static str {
        match self {
            RepeatMode::SpellDigits => "digits",
            RepeatMode::RepeatNumber => "number",
            RepeatMode::Off => "none",
        }
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "digits" | "spell" | "repeat-as-digits" => Ok(RepeatMode::SpellDigits),
            "number" | "repeat" | "repeat-as-number" => Ok(RepeatMode::RepeatNumber),
            "none" | "off" => Ok(RepeatMode::Off),
            _ => Err(()),
        }
    }
}

/// Spell each digit of a number, comma separated (23 -> "dos, tres")
pub fn spell_digits(number: u8) -> String {
    number
        .to_string()
        .bytes()
        .map(|digit| DIGIT_WORDS[(digit - b'0') as usize])
        .collect::<Vec<_>>()
        .join(", ")
}

/// The ordered phrases for one draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationPlan {
    pub primary: String,
    pub secondary: Option<String>,
    /// Gap between the end of `primary` and the start of `secondary`
    pub pause: Duration,
}

impl NarrationPlan {
    pub fn build(number: u8, category: Option<Category>, repeat_mode: RepeatMode) -> Self {
        let primary = match category {
            Some(category) => format!("{} {}", category, number),
            None => number.to_string(),
        };

        let secondary = match repeat_mode {
            RepeatMode::SpellDigits => Some(spell_digits(number)),
            RepeatMode::RepeatNumber => Some(primary.clone()),
            RepeatMode::Off => None,
        };

        let pause = if (1..=9).contains(&number) {
            SINGLE_DIGIT_PAUSE
        } else {
            MULTI_DIGIT_PAUSE
        };

        Self {
            primary,
            secondary,
            pause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_digits() {
        assert_eq!(spell_digits(7), "siete");
        assert_eq!(spell_digits(23), "dos, tres");
        assert_eq!(spell_digits(70), "siete, cero");
        assert_eq!(spell_digits(11), "uno, uno");
    }

    #[test]
    fn test_single_digit_plan() {
        let plan = NarrationPlan::build(7, Some(Category::B), RepeatMode::SpellDigits);
        assert_eq!(plan.primary, "B 7");
        assert_eq!(plan.secondary.as_deref(), Some("siete"));
        assert_eq!(plan.pause, SINGLE_DIGIT_PAUSE);
    }

    #[test]
    fn test_repeat_modes() {
        let plan = NarrationPlan::build(42, Some(Category::N), RepeatMode::RepeatNumber);
        assert_eq!(plan.primary, "N 42");
        assert_eq!(plan.secondary.as_deref(), Some("N 42"));
        assert_eq!(plan.pause, MULTI_DIGIT_PAUSE);

        let plan = NarrationPlan::build(42, Some(Category::N), RepeatMode::Off);
        assert_eq!(plan.secondary, None);
    }

    #[test]
    fn test_repeat_mode_parse() {
        assert_eq!("Digits".parse::<RepeatMode>(), Ok(RepeatMode::SpellDigits));
        assert_eq!("off".parse::<RepeatMode>(), Ok(RepeatMode::Off));
        assert!("loud".parse::<RepeatMode>().is_err());
        assert_eq!(
            serde_json::to_string(&RepeatMode::RepeatNumber).unwrap(),
            "\"number\""
        );
    }
}
