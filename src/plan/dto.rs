use serde::{Deserialize, Serialize};

/// Raw query parameters for `GET /meal/generate`. Everything is optional;
/// normalization supplies the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub food_preferences: Option<String>,
    #[serde(default)]
    pub risky_foods: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub body_goal: Option<String>,
    #[serde(default)]
    pub calorie_target: Option<String>,
}

/// Weight-management objective. Unknown values fall back to `Maintain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Gain,
    Lose,
    #[default]
    Maintain,
}

impl Goal {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("gain") => Goal::Gain,
            Some("lose") => Goal::Lose,
            _ => Goal::Maintain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Gain => "gain",
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
        }
    }

    /// Daily calorie default applied when neither the plan nor the caller
    /// supplied a usable figure.
    pub fn default_calories(&self) -> u32 {
        match self {
            Goal::Gain => 2200,
            Goal::Lose => 1700,
            Goal::Maintain => 1900,
        }
    }
}

/// The four fixed meal slots of a day. Values are always present (possibly
/// empty), never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: Vec<String>,
    #[serde(default)]
    pub lunch: Vec<String>,
    #[serde(default)]
    pub dinner: Vec<String>,
    #[serde(default)]
    pub snacks: Vec<String>,
}

/// One canonical day of a plan. `calories` is `Some` for every day once the
/// hydrator has run; the normalizer alone leaves uncoercible values as
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDay {
    pub day: String,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub meals: Meals,
}
