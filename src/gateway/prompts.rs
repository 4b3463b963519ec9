//! Prompt templates for the API gateway.
//!
//! Every remote call is one system instruction plus one user message:
//!
//! - **Risk assessment**: a fixed system instruction and a user prompt that
//!   embeds every metric and spells out the JSON shape expected back.
//! - **Advice**: a per-topic system instruction that restricts the model to
//!   diet or exercise questions; the user message is the text as typed.

use crate::assessment::RiskMetrics;

// ---------------------------------------------------------------------------
// Advice topics
// ---------------------------------------------------------------------------

/// Scope of an advisory chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Diet,
    Exercise,
}

impl Topic {
    /// System instruction sent with every advisory request for this topic.
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::Diet => DIET_SYSTEM_INSTRUCTION,
            Self::Exercise => EXERCISE_SYSTEM_INSTRUCTION,
        }
    }

    /// Assistant message that opens a fresh chat panel.
    pub fn greeting(self) -> &'static str {
        match self {
            Self::Diet => {
                "Hello! I'm your diet assistant. Ask me any questions about diet recommendations \
                 for managing diabetes or maintaining a healthy lifestyle."
            }
            Self::Exercise => {
                "Hello! I'm your exercise assistant. Ask me any questions about exercise plans \
                 for managing diabetes or maintaining a healthy lifestyle."
            }
        }
    }

    /// Fixed reply used when the remote call fails.
    pub fn apology(self) -> &'static str {
        match self {
            Self::Diet => {
                "I'm sorry, I couldn't generate diet recommendations at this time. \
                 Please try again later."
            }
            Self::Exercise => {
                "I'm sorry, I couldn't generate exercise recommendations at this time. \
                 Please try again later."
            }
        }
    }

    /// Parse a topic name (`diet` or `exercise`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "diet" | "nutrition" => Some(Self::Diet),
            "exercise" | "fitness" => Some(Self::Exercise),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Exercise => "exercise",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DIET_SYSTEM_INSTRUCTION: &str = "\
You are a nutritionist specializing in diabetes management.
Only answer questions related to diet, nutrition, and food recommendations for diabetes management.
If the question is not related to diet or nutrition, politely decline to answer and suggest asking a diet-related question.
Keep your answers precise and short.
Format your responses using bullet points whenever possible.
Focus on evidence-based dietary recommendations.";

const EXERCISE_SYSTEM_INSTRUCTION: &str = "\
You are a certified fitness trainer specializing in exercise programs for people with diabetes.
Only answer questions related to exercise, physical activity, and fitness for diabetes management.
If the question is not related to exercise or fitness, politely decline to answer and suggest asking an exercise-related question.
Keep your answers precise and short.
Format your responses using bullet points whenever possible.
Focus on safe and effective exercise recommendations for people with diabetes.";

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

/// System instruction for risk assessments.
pub const RISK_SYSTEM_INSTRUCTION: &str = "You are a medical AI assistant specialized in diabetes \
risk assessment. Provide accurate assessments based on health metrics. Always respond with a \
valid JSON object.";

/// Build the user prompt for a risk assessment.
pub fn risk_prompt(metrics: &RiskMetrics) -> String {
    format!(
        "I need a diabetes risk assessment based on the following health metrics:
- Gender: {gender}
- Age: {age} years
- Pregnancies: {pregnancies}
- Glucose Level: {glucose} mg/dL
- Blood Pressure: {blood_pressure} mm Hg
- Skin Thickness: {skin_thickness} mm
- Insulin: {insulin} mu U/ml
- BMI: {bmi}
- Diabetes Pedigree Function: {pedigree}

Based on these metrics, provide a diabetes risk assessment with the following information:
1. Prediction (Diabetic or Non-Diabetic)
2. Probability (as a decimal between 0 and 1)
3. Risk Level (low, moderate, or high)

Format your response as a JSON object with the following structure:
{{
  \"prediction\": \"Diabetic\" or \"Non-Diabetic\",
  \"probability\": decimal between 0 and 1,
  \"risk\": \"low\", \"moderate\", or \"high\"
}}",
        gender = metrics.gender,
        age = metrics.age,
        pregnancies = metrics.pregnancies,
        glucose = metrics.glucose,
        blood_pressure = metrics.blood_pressure,
        skin_thickness = metrics.skin_thickness,
        insulin = metrics.insulin,
        bmi = metrics.bmi,
        pedigree = metrics.diabetes_pedigree,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Gender;

    #[test]
    fn risk_prompt_embeds_every_metric() {
        let metrics = RiskMetrics {
            glucose: 145.0,
            blood_pressure: 82.0,
            skin_thickness: 31.0,
            insulin: 120.0,
            bmi: 27.4,
            diabetes_pedigree: 0.62,
            age: 51.0,
            pregnancies: 2.0,
            gender: Gender::Female,
        };
        let prompt = risk_prompt(&metrics);
        assert!(prompt.contains("- Gender: female"));
        assert!(prompt.contains("- Age: 51 years"));
        assert!(prompt.contains("- Pregnancies: 2"));
        assert!(prompt.contains("- Glucose Level: 145 mg/dL"));
        assert!(prompt.contains("- Blood Pressure: 82 mm Hg"));
        assert!(prompt.contains("- Skin Thickness: 31 mm"));
        assert!(prompt.contains("- Insulin: 120 mu U/ml"));
        assert!(prompt.contains("- BMI: 27.4"));
        assert!(prompt.contains("- Diabetes Pedigree Function: 0.62"));
        assert!(prompt.contains("\"prediction\": \"Diabetic\" or \"Non-Diabetic\""));
    }

    #[test]
    fn topic_instructions_are_scoped() {
        assert!(Topic::Diet.system_instruction().contains("nutritionist"));
        assert!(!Topic::Diet.system_instruction().contains("fitness trainer"));
        assert!(Topic::Exercise.system_instruction().contains("fitness trainer"));
    }

    #[test]
    fn topic_parse_accepts_names() {
        assert_eq!(Topic::parse("diet"), Some(Topic::Diet));
        assert_eq!(Topic::parse(" Exercise "), Some(Topic::Exercise));
        assert_eq!(Topic::parse("fitness"), Some(Topic::Exercise));
        assert_eq!(Topic::parse("sleep"), None);
    }

    #[test]
    fn apologies_differ_per_topic() {
        assert_ne!(Topic::Diet.apology(), Topic::Exercise.apology());
        assert!(Topic::Diet.apology().starts_with("I'm sorry"));
    }
}
