use serde::{Deserialize, Serialize};

use super::CatalogEntry;

/// Tag labels offered as quick filters on the diet list.
pub const DIET_TAG_FILTERS: [&str; 6] = [
    "Low Carb",
    "Heart-Healthy",
    "Diabetes-Friendly",
    "Weight Loss",
    "Vegetarian",
    "High-Fiber",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub foods_to_eat: Vec<String>,
    #[serde(default)]
    pub foods_to_avoid: Vec<String>,
    #[serde(default)]
    pub meal_plan: Vec<MealDay>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub research: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDay {
    pub day: String,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Breakfast, Lunch, Dinner, Snack.
    pub kind: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
}

/// Per-serving nutrition; macros in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: u32,
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
}

/// List-view projection of a [`DietPlan`].
#[derive(Debug, Clone, Serialize)]
pub struct DietSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub featured: bool,
}

impl DietPlan {
    pub fn summary(&self) -> DietSummary<'_> {
        DietSummary {
            id: &self.id,
            title: &self.title,
            description: &self.description,
            tags: &self.tags,
            featured: self.featured,
        }
    }
}

impl CatalogEntry for DietPlan {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}
