//! Built-in diet and exercise catalog.
//!
//! Both tables are TOML documents embedded in the binary and parsed once by
//! [`Catalog::builtin`]. Entries are immutable after load; browsing is by id
//! or through a [`CatalogQuery`].

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub mod diet;
pub mod exercise;

pub use diet::{DIET_TAG_FILTERS, DietPlan, Meal, MealDay, Nutrition};
pub use exercise::{Exercise, ExerciseDay, ExercisePlan, Intensity, Level};

const DIETS_TOML: &str = include_str!("data/diets.toml");
const EXERCISES_TOML: &str = include_str!("data/exercises.toml");

// ---------------------------------------------------------------------------
// Entry seam
// ---------------------------------------------------------------------------

/// Fields a catalog entry exposes to filtering.
///
/// Entries without a level or category return `None`; such entries never
/// match a concrete level or category filter.
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[String];

    fn level(&self) -> Option<&str> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Filter over a catalog table. The default query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring of title or description.
    pub text: String,
    /// Any-of tag set.
    pub tags: Vec<String>,
    /// Exact level; `None`, empty or `"all"` disables the filter.
    pub level: Option<String>,
    /// Exact category; `None`, empty or `"all"` disables the filter.
    pub category: Option<String>,
}

impl CatalogQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &impl CatalogEntry) -> bool {
        self.matches_text(entry)
            && self.matches_tags(entry)
            && facet_matches(self.level.as_deref(), entry.level())
            && facet_matches(self.category.as_deref(), entry.category())
    }

    fn matches_text(&self, entry: &impl CatalogEntry) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        entry.title().to_lowercase().contains(&needle)
            || entry.description().to_lowercase().contains(&needle)
    }

    fn matches_tags(&self, entry: &impl CatalogEntry) -> bool {
        self.tags.is_empty()
            || entry
                .tags()
                .iter()
                .any(|tag| self.tags.iter().any(|want| want.eq_ignore_ascii_case(tag)))
    }
}

fn facet_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) if w.is_empty() || w.eq_ignore_ascii_case("all") => true,
        Some(w) => actual.is_some_and(|a| a.eq_ignore_ascii_case(w)),
    }
}

/// Entries matching `query`, in table order.
pub fn filter<'a, T: CatalogEntry>(entries: &'a [T], query: &CatalogQuery) -> Vec<&'a T> {
    entries.iter().filter(|entry| query.matches(*entry)).collect()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Document<T> {
    #[serde(rename = "plan", default = "Vec::new")]
    plans: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    diets: Vec<DietPlan>,
    exercises: Vec<ExercisePlan>,
}

impl Catalog {
    /// Parse the embedded tables.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DIETS_TOML, EXERCISES_TOML).context("built-in catalog is invalid")
    }

    /// Parse two TOML documents of `[[plan]]` tables. Duplicate ids are an
    /// error.
    pub fn from_toml(diets: &str, exercises: &str) -> Result<Self> {
        let diets: Document<DietPlan> =
            toml::from_str(diets).context("failed to parse diet plans")?;
        let exercises: Document<ExercisePlan> =
            toml::from_str(exercises).context("failed to parse exercise plans")?;

        ensure_unique_ids("diet", &diets.plans)?;
        ensure_unique_ids("exercise", &exercises.plans)?;

        Ok(Self {
            diets: diets.plans,
            exercises: exercises.plans,
        })
    }

    pub fn diets(&self) -> &[DietPlan] {
        &self.diets
    }

    pub fn exercises(&self) -> &[ExercisePlan] {
        &self.exercises
    }

    pub fn diet(&self, id: &str) -> Option<&DietPlan> {
        self.diets.iter().find(|plan| plan.id == id)
    }

    pub fn exercise(&self, id: &str) -> Option<&ExercisePlan> {
        self.exercises.iter().find(|plan| plan.id == id)
    }

    pub fn filter_diets(&self, query: &CatalogQuery) -> Vec<&DietPlan> {
        filter(&self.diets, query)
    }

    pub fn filter_exercises(&self, query: &CatalogQuery) -> Vec<&ExercisePlan> {
        filter(&self.exercises, query)
    }

    /// Distinct exercise categories in first-seen order.
    pub fn exercise_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.exercises
            .iter()
            .map(|plan| plan.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }
}

fn ensure_unique_ids<T: CatalogEntry>(table: &str, entries: &[T]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id()) {
            bail!("duplicate {table} plan id '{}'", entry.id());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.diets().len(), 6);
        assert_eq!(catalog.exercises().len(), 6);
        assert_eq!(catalog.diets()[0].id, "low-carb");
        assert_eq!(catalog.exercises()[0].id, "walking");
    }

    #[test]
    fn builtin_nested_schedule_data() {
        let catalog = Catalog::builtin().unwrap();
        let low_carb = catalog.diet("low-carb").unwrap();
        let breakfast = &low_carb.meal_plan[0].meals[0];
        assert_eq!(low_carb.meal_plan[0].day, "Monday");
        assert_eq!(breakfast.name, "Veggie Egg Scramble");
        assert_eq!(
            breakfast.nutrition,
            Some(Nutrition {
                calories: 350,
                carbs: 9,
                protein: 22,
                fat: 26
            })
        );

        let walking = catalog.exercise("walking").unwrap();
        let monday = &walking.schedule[0];
        assert_eq!(monday.exercises.len(), 3);
        assert_eq!(monday.intensity, Intensity::Low);
        assert_eq!(monday.total_duration, "45-50 minutes");
        assert_eq!(monday.exercises[2].sets, Some(2));
        assert_eq!(monday.exercises[2].reps, Some(15));
    }

    #[test]
    fn facet_all_and_empty_disable_filter() {
        assert!(facet_matches(None, None));
        assert!(facet_matches(Some("all"), None));
        assert!(facet_matches(Some("ALL"), Some("Cardio")));
        assert!(facet_matches(Some(""), None));
        assert!(facet_matches(Some("cardio"), Some("Cardio")));
        assert!(!facet_matches(Some("Cardio"), None));
        assert!(!facet_matches(Some("Strength"), Some("Cardio")));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let diets = r#"
[[plan]]
id = "a"
title = "A"
description = "first"

[[plan]]
id = "a"
title = "A again"
description = "second"
"#;
        let err = Catalog::from_toml(diets, "").unwrap_err();
        assert!(err.to_string().contains("duplicate diet plan id 'a'"));
    }

    #[test]
    fn empty_documents_are_valid() {
        let catalog = Catalog::from_toml("", "").unwrap();
        assert!(catalog.diets().is_empty());
        assert!(catalog.filter_exercises(&CatalogQuery::default()).is_empty());
    }

    #[test]
    fn categories_are_distinct_in_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.exercise_categories(),
            vec!["Cardio", "Strength", "Flexibility"]
        );
    }
}
