//! Risk form: the metric set, its ranges, and clamped field updates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    #[default]
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric metrics
// ---------------------------------------------------------------------------

/// A numeric field of the risk form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigree,
    Age,
    Pregnancies,
}

/// Range, step and default of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSpec {
    pub metric: Metric,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// Number of decimals kept (0 → step 1, 1 → step 0.1, 2 → step 0.01).
    pub decimals: u32,
    pub default: f64,
}

impl MetricSpec {
    pub fn step(&self) -> f64 {
        1.0 / 10f64.powi(self.decimals as i32)
    }

    /// Clamp into `[min, max]` and snap to the step. NaN becomes the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        let scale = 10f64.powi(self.decimals as i32);
        let snapped = (value * scale).round() / scale;
        snapped.clamp(self.min, self.max)
    }
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Glucose,
        Metric::BloodPressure,
        Metric::SkinThickness,
        Metric::Insulin,
        Metric::Bmi,
        Metric::DiabetesPedigree,
        Metric::Age,
        Metric::Pregnancies,
    ];

    pub fn spec(self) -> MetricSpec {
        let (label, unit, min, max, decimals, default) = match self {
            Self::Glucose => ("Glucose Level", "mg/dL", 70.0, 200.0, 0, 120.0),
            Self::BloodPressure => ("Blood Pressure", "mm Hg", 40.0, 130.0, 0, 70.0),
            Self::SkinThickness => ("Skin Thickness", "mm", 10.0, 50.0, 0, 20.0),
            Self::Insulin => ("Insulin Level", "mu U/ml", 0.0, 300.0, 0, 80.0),
            Self::Bmi => ("BMI", "", 15.0, 50.0, 1, 25.0),
            Self::DiabetesPedigree => ("Diabetes Pedigree Function", "", 0.1, 2.5, 2, 0.5),
            Self::Age => ("Age", "years", 18.0, 100.0, 0, 30.0),
            Self::Pregnancies => ("Number of Pregnancies", "", 0.0, 15.0, 0, 0.0),
        };
        MetricSpec {
            metric: self,
            label,
            unit,
            min,
            max,
            decimals,
            default,
        }
    }

    /// Parse a field name as used by the JSON API and the CLI.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "glucose" => Some(Self::Glucose),
            "blood_pressure" | "bloodpressure" => Some(Self::BloodPressure),
            "skin_thickness" | "skinthickness" => Some(Self::SkinThickness),
            "insulin" => Some(Self::Insulin),
            "bmi" => Some(Self::Bmi),
            "diabetes_pedigree" | "diabetespedigree" | "pedigree" => Some(Self::DiabetesPedigree),
            "age" => Some(Self::Age),
            "pregnancies" => Some(Self::Pregnancies),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Metric set
// ---------------------------------------------------------------------------

/// The full set of values submitted for one assessment.
///
/// Construct through [`RiskMetrics::default`] and [`RiskMetrics::set`] (or
/// [`RiskMetrics::clamped`] for externally supplied values) to keep every
/// field inside its range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMetrics {
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
    pub pregnancies: f64,
    pub gender: Gender,
}

impl Default for RiskMetrics {
    fn default() -> Self {
        Self {
            glucose: Metric::Glucose.spec().default,
            blood_pressure: Metric::BloodPressure.spec().default,
            skin_thickness: Metric::SkinThickness.spec().default,
            insulin: Metric::Insulin.spec().default,
            bmi: Metric::Bmi.spec().default,
            diabetes_pedigree: Metric::DiabetesPedigree.spec().default,
            age: Metric::Age.spec().default,
            pregnancies: Metric::Pregnancies.spec().default,
            gender: Gender::default(),
        }
    }
}

impl RiskMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Glucose => self.glucose,
            Metric::BloodPressure => self.blood_pressure,
            Metric::SkinThickness => self.skin_thickness,
            Metric::Insulin => self.insulin,
            Metric::Bmi => self.bmi,
            Metric::DiabetesPedigree => self.diabetes_pedigree,
            Metric::Age => self.age,
            Metric::Pregnancies => self.pregnancies,
        }
    }

    /// Write one field, clamped and snapped to its range. Returns the stored value.
    pub fn set(&mut self, metric: Metric, value: f64) -> f64 {
        let value = metric.spec().clamp(value);
        let slot = match metric {
            Metric::Glucose => &mut self.glucose,
            Metric::BloodPressure => &mut self.blood_pressure,
            Metric::SkinThickness => &mut self.skin_thickness,
            Metric::Insulin => &mut self.insulin,
            Metric::Bmi => &mut self.bmi,
            Metric::DiabetesPedigree => &mut self.diabetes_pedigree,
            Metric::Age => &mut self.age,
            Metric::Pregnancies => &mut self.pregnancies,
        };
        *slot = value;
        value
    }

    /// Copy with every numeric field clamped to its range.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for metric in Metric::ALL {
            out.set(metric, self.get(metric));
        }
        out
    }

    /// Whether the pregnancies field applies (only asked for females).
    pub fn asks_pregnancies(&self) -> bool {
        self.gender == Gender::Female
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_defaults() {
        let m = RiskMetrics::default();
        assert_eq!(m.glucose, 120.0);
        assert_eq!(m.blood_pressure, 70.0);
        assert_eq!(m.skin_thickness, 20.0);
        assert_eq!(m.insulin, 80.0);
        assert_eq!(m.bmi, 25.0);
        assert_eq!(m.diabetes_pedigree, 0.5);
        assert_eq!(m.age, 30.0);
        assert_eq!(m.pregnancies, 0.0);
        assert_eq!(m.gender, Gender::Female);
    }

    #[test]
    fn set_clamps_to_range() {
        let mut m = RiskMetrics::default();
        assert_eq!(m.set(Metric::Glucose, 500.0), 200.0);
        assert_eq!(m.set(Metric::Glucose, 10.0), 70.0);
        assert_eq!(m.set(Metric::Age, 12.0), 18.0);
        assert_eq!(m.set(Metric::Pregnancies, -3.0), 0.0);
        assert_eq!(m.set(Metric::DiabetesPedigree, 9.0), 2.5);
        assert_eq!(m.glucose, 70.0);
    }

    #[test]
    fn set_snaps_to_step() {
        let mut m = RiskMetrics::default();
        assert_eq!(m.set(Metric::Glucose, 133.6), 134.0);
        assert_eq!(m.set(Metric::Bmi, 27.44), 27.4);
        assert_eq!(m.set(Metric::DiabetesPedigree, 0.627), 0.63);
        assert_eq!(m.bmi.to_string(), "27.4");
    }

    #[test]
    fn nan_becomes_default() {
        let mut m = RiskMetrics::default();
        assert_eq!(m.set(Metric::Insulin, f64::NAN), 80.0);
    }

    #[test]
    fn clamped_fixes_every_field() {
        let raw = RiskMetrics {
            glucose: 999.0,
            blood_pressure: 0.0,
            skin_thickness: 100.0,
            insulin: -1.0,
            bmi: 60.0,
            diabetes_pedigree: 0.0,
            age: 150.0,
            pregnancies: 40.0,
            gender: Gender::Male,
        };
        let m = raw.clamped();
        assert_eq!(m.glucose, 200.0);
        assert_eq!(m.blood_pressure, 40.0);
        assert_eq!(m.skin_thickness, 50.0);
        assert_eq!(m.insulin, 0.0);
        assert_eq!(m.bmi, 50.0);
        assert_eq!(m.diabetes_pedigree, 0.1);
        assert_eq!(m.age, 100.0);
        assert_eq!(m.pregnancies, 15.0);
        assert_eq!(m.gender, Gender::Male);
    }

    #[test]
    fn metric_parse_accepts_common_spellings() {
        assert_eq!(Metric::parse("glucose"), Some(Metric::Glucose));
        assert_eq!(Metric::parse("bloodPressure"), Some(Metric::BloodPressure));
        assert_eq!(Metric::parse("blood-pressure"), Some(Metric::BloodPressure));
        assert_eq!(Metric::parse("pedigree"), Some(Metric::DiabetesPedigree));
        assert_eq!(Metric::parse("height"), None);
    }

    #[test]
    fn gender_parse_and_display() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse("f"), Some(Gender::Female));
        assert_eq!(Gender::parse("unknown"), None);
        assert_eq!(Gender::Other.to_string(), "other");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let m: RiskMetrics = serde_json::from_str(r#"{"glucose": 150, "gender": "male"}"#).unwrap();
        assert_eq!(m.glucose, 150.0);
        assert_eq!(m.gender, Gender::Male);
        assert_eq!(m.age, 30.0);
        assert!(!m.asks_pregnancies());
    }
}
