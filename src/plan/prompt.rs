use serde::Serialize;

use super::dto::{Goal, PlanQuery};

/// Canonical, fully-defaulted parameter set for one plan request. Building
/// this never fails: missing fields become empty strings and unknown goals
/// become `Maintain`.
#[derive(Debug, Clone)]
pub struct PlanAttributes {
    pub goal: Goal,
    pub dietary_preference: String,
    pub allergies: String,
    pub food_preferences: String,
    pub risky_foods: String,
    pub body_type: String,
    pub body_goal: String,
    pub calorie_target: Option<String>,
}

impl PlanAttributes {
    pub fn from_query(query: &PlanQuery) -> Self {
        let text = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_string();
        let calorie_target = query
            .calorie_target
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self {
            goal: Goal::parse(query.goal.as_deref()),
            dietary_preference: text(&query.dietary_preference),
            allergies: text(&query.allergies),
            food_preferences: text(&query.food_preferences),
            risky_foods: text(&query.risky_foods),
            body_type: text(&query.body_type),
            body_goal: text(&query.body_goal),
            calorie_target,
        }
    }
}

/// Chat-style instruction payload sent to the generation service.
#[derive(Debug, Clone, Serialize)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

pub fn build_prompt(attrs: &PlanAttributes) -> PromptPayload {
    let system = "You are a nutritionist specializing in healthy Filipino cuisine. \
        Always return ONLY a JSON object with a single key 'days'. The value must be \
        an array of exactly 7 day objects. Each day object must include a 'day' string, \
        a 'calories' number representing the approximate total calories for that day, \
        and a 'meals' object. The 'meals' object must include 'breakfast', 'lunch', \
        'dinner', and 'snacks' arrays of meal strings that highlight nutrient-dense \
        Filipino dishes using lean proteins, vegetables, fruits, and whole grains. \
        Honor the stated goal, dietary preference, food preferences, body type, body \
        goal, and allergies. Avoid risky foods or disease triggers provided by the \
        user. Keep calories realistic (generally 1,500-2,300 kcal unless the goal or a \
        calorie target suggests otherwise). No extra keys or narration."
        .to_string();

    let body_goal = or_placeholder(&attrs.body_goal, attrs.goal.as_str());
    let calorie_target = attrs
        .calorie_target
        .as_deref()
        .unwrap_or("use a balanced target");

    let user = format!(
        "Generate a 7-day meal plan for:\n\
         - Goal: {goal}\n\
         - Dietary preference: {dietary}\n\
         - Allergies: {allergies}\n\
         - Food preferences: {foods}\n\
         - Risky foods / disease considerations: {risky}\n\
         - Body type: {body_type}\n\
         - Body goal: {body_goal}\n\
         - Calorie target (per day): {calorie_target}\n\n\
         Focus on wholesome Filipino dishes--plenty of vegetables, fruits, legumes, \
         lean meats or seafood, brown rice, adlai, and minimal added sugar--while \
         aligning with the goal, dietary preference, and allergies.\n\
         Reflect food preferences, avoid risky foods, and bias choices toward the \
         stated body type and body goal. Keep daily calories close to the provided \
         calorie target if given; otherwise stay sensible for the goal.\n\n\
         Return a JSON object with a 'days' array of exactly 7 sequential days \
         (Day 1 through Day 7). Each day needs 'day', 'calories', and a 'meals' \
         object with 'breakfast', 'lunch', 'dinner', and 'snacks' arrays, every \
         array containing one or more meal strings.",
        goal = attrs.goal.as_str(),
        dietary = or_placeholder(&attrs.dietary_preference, "none"),
        allergies = or_placeholder(&attrs.allergies, "none"),
        foods = or_placeholder(&attrs.food_preferences, "none"),
        risky = or_placeholder(&attrs.risky_foods, "none"),
        body_type = or_placeholder(&attrs.body_type, "unspecified"),
        body_goal = body_goal,
        calorie_target = calorie_target,
    );

    PromptPayload { system, user }
}
