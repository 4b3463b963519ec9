use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Diabetic", alias = "diabetic", alias = "DIABETIC")]
    Diabetic,
    #[serde(
        rename = "Non-Diabetic",
        alias = "Non-diabetic",
        alias = "non-diabetic",
        alias = "NonDiabetic",
        alias = "non_diabetic"
    )]
    NonDiabetic,
}

impl Prediction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diabetic => "Diabetic",
            Self::NonDiabetic => "Non-Diabetic",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Moderate", alias = "MODERATE", alias = "medium")]
    Moderate,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded risk reply. `probability` is taken as reported; it is not range
/// checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Prediction,
    pub probability: f64,
    pub risk: RiskLevel,
}

/// Glucose level above which the fallback heuristic reports diabetic.
pub const FALLBACK_GLUCOSE_THRESHOLD: f64 = 140.0;

impl PredictionResult {
    /// Heuristic used when the remote reply cannot be parsed.
    pub fn glucose_fallback(glucose: f64) -> Self {
        if glucose > FALLBACK_GLUCOSE_THRESHOLD {
            Self {
                prediction: Prediction::Diabetic,
                probability: 0.75,
                risk: RiskLevel::High,
            }
        } else {
            Self {
                prediction: Prediction::NonDiabetic,
                probability: 0.25,
                risk: RiskLevel::Low,
            }
        }
    }

    /// Probability as a whole percentage, as shown to the user.
    pub fn probability_pct(&self) -> i64 {
        (self.probability * 100.0).round() as i64
    }

    /// The "what this means" paragraph for this prediction.
    pub fn interpretation(&self) -> &'static str {
        match self.prediction {
            Prediction::Diabetic => DIABETIC_INTERPRETATION,
            Prediction::NonDiabetic => NON_DIABETIC_INTERPRETATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Parsed from the model's reply.
    Remote,
    /// Produced by the glucose heuristic.
    Fallback,
}

/// A result plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub source: ResultSource,
}

const DIABETIC_INTERPRETATION: &str = "Based on the information you provided, our model indicates that you may have a higher risk of diabetes. This is not a diagnosis, but we recommend consulting with a healthcare professional for further evaluation.";

const NON_DIABETIC_INTERPRETATION: &str = "Based on the information you provided, our model indicates that you currently have a lower risk of diabetes. However, it's always good to maintain healthy habits and regular check-ups.";

/// Recommended next steps, shown with every result.
pub const NEXT_STEPS: [&str; 4] = [
    "Consult with a healthcare professional for a proper medical evaluation",
    "Explore our Diet Recommendations section for healthy eating tips",
    "Check out our Exercise Plans to help maintain healthy blood sugar levels",
    "Schedule regular check-ups to monitor your health",
];
