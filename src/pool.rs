//! Categories and Pool Generation
//!
//! The number space 1..=75 is split into the five fixed B-I-N-G-O
//! categories. The active pool is the union of the enabled ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::warn;

/// A named, fixed partition of the number space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    B,
    I,
    N,
    G,
    O,
}

impl Category {
    /// Get all categories in board order
    pub fn all() -> [Category; 5] {
        [
            Category::B,
            Category::I,
            Category::N,
            Category::G,
            Category::O,
        ]
    }

    /// Inclusive number range covered by this category
    pub fn range(&self) -> RangeInclusive<u8> {
        match self {
            Category::B => 1..=15,
            Category::I => 16..=30,
            Category::N => 31..=45,
            Category::G => 46..=60,
            Category::O => 61..=75,
        }
    }

    /// Letter used on the board and in announcements
    pub fn label(&self) -> &'static str {
        match self {
            Category::B => "B",
            Category::I => "I",
            Category::N => "N",
            Category::G => "G",
            Category::O => "O",
        }
    }

    /// Find the category a number belongs to
    pub fn of(number: u8) -> Option<Category> {
        Self::all()
            .into_iter()
            .find(|category| category.range().contains(&number))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "B" => Ok(Category::B),
            "I" => Ok(Category::I),
            "N" => Ok(Category::N),
            "G" => Ok(Category::G),
            "O" => Ok(Category::O),
            _ => Err(()),
        }
    }
}

/// Enabled flag per category. Categories without an entry count as enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledCategories(BTreeMap<Category, bool>);

impl Default for EnabledCategories {
    fn default() -> Self {
        Self(Category::all().into_iter().map(|c| (c, true)).collect())
    }
}

impl EnabledCategories {
    /// Build from explicit flags; missing categories stay enabled
    pub fn from_flags(flags: impl IntoIterator<Item = (Category, bool)>) -> Self {
        let mut enabled = Self::default();
        for (category, on) in flags {
            enabled.set(category, on);
        }
        enabled
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.0.get(&category).copied().unwrap_or(true)
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        self.0.insert(category, enabled);
    }

    /// Flip a category and return its new state
    pub fn toggle(&mut self, category: Category) -> bool {
        let enabled = !self.is_enabled(category);
        self.set(category, enabled);
        enabled
    }

    /// Categories currently switched on, in board order
    pub fn enabled(&self) -> Vec<Category> {
        Category::all()
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }
}

/// The numbers eligible for drawing in the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    numbers: Vec<u8>,
    fallback: bool,
}

impl Pool {
    /// Ascending numbers in the pool
    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }

    /// True when no category was enabled and the full range was substituted
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Derive the draw pool from the enabled categories.
///
/// With nothing enabled the full 1..=75 range is used for this session
/// only; `categories` itself is never modified.
pub fn generate_pool(categories: &EnabledCategories) -> Pool {
    let mut numbers = collect_ranges(categories.enabled());
    let fallback = numbers.is_empty();

    if fallback {
        warn!("⚠️ No categories enabled, defaulting to all categories");
        numbers = collect_ranges(Category::all());
    }

    Pool { numbers, fallback }
}

fn collect_ranges(categories: impl IntoIterator<Item = Category>) -> Vec<u8> {
    let mut numbers: Vec<u8> = categories.into_iter().flat_map(|c| c.range()).collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        assert_eq!(Category::of(1), Some(Category::B));
        assert_eq!(Category::of(15), Some(Category::B));
        assert_eq!(Category::of(16), Some(Category::I));
        assert_eq!(Category::of(45), Some(Category::N));
        assert_eq!(Category::of(60), Some(Category::G));
        assert_eq!(Category::of(75), Some(Category::O));
        assert_eq!(Category::of(0), None);
        assert_eq!(Category::of(76), None);
    }

    #[test]
    fn test_full_pool() {
        let pool = generate_pool(&EnabledCategories::default());
        assert_eq!(pool.len(), 75);
        assert_eq!(pool.numbers().first(), Some(&1));
        assert_eq!(pool.numbers().last(), Some(&75));
        assert!(!pool.is_fallback());
    }

    #[test]
    fn test_b_and_o_only() {
        let categories = EnabledCategories::from_flags([
            (Category::I, false),
            (Category::N, false),
            (Category::G, false),
        ]);
        let pool = generate_pool(&categories);

        assert_eq!(pool.len(), 30);
        assert!(pool.contains(1) && pool.contains(15));
        assert!(pool.contains(61) && pool.contains(75));
        assert!((16..=60).all(|n| !pool.contains(n)));
        assert!(pool.numbers().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fallback_does_not_touch_flags() {
        let categories =
            EnabledCategories::from_flags(Category::all().into_iter().map(|c| (c, false)));
        let pool = generate_pool(&categories);

        assert!(pool.is_fallback());
        assert_eq!(pool.len(), 75);
        assert!(categories.enabled().is_empty());
    }

    #[test]
    fn test_toggle_and_parse() {
        let mut categories = EnabledCategories::default();
        assert!(!categories.toggle(Category::G));
        assert!(!categories.is_enabled(Category::G));
        assert!(categories.toggle(Category::G));

        assert_eq!("o".parse::<Category>(), Ok(Category::O));
        assert!("x".parse::<Category>().is_err());
    }

    #[test]
    fn test_categories_serialize_as_letter_map() {
        let json = serde_json::to_string(&EnabledCategories::default()).unwrap();
        assert_eq!(json, r#"{"B":true,"I":true,"N":true,"G":true,"O":true}"#);
    }
}
