use serde::{Deserialize, Serialize};

use super::CatalogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Session length as displayed, e.g. "30 minutes".
    pub duration: String,
    pub level: Level,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<ExerciseDay>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDay {
    pub day: String,
    pub focus: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub warmup: String,
    pub cooldown: String,
    pub total_duration: String,
    pub intensity: Intensity,
    pub calories_burn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_between: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
}

/// List-view projection of an [`ExercisePlan`].
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub duration: &'a str,
    pub level: Level,
    pub category: &'a str,
    pub benefits: &'a [String],
    pub featured: bool,
}

impl ExercisePlan {
    pub fn summary(&self) -> ExerciseSummary<'_> {
        ExerciseSummary {
            id: &self.id,
            title: &self.title,
            description: &self.description,
            duration: &self.duration,
            level: self.level,
            category: &self.category,
            benefits: &self.benefits,
            featured: self.featured,
        }
    }
}

impl CatalogEntry for ExercisePlan {
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

    fn level(&self) -> Option<&str> {
        Some(self.level.as_str())
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}
