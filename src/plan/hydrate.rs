use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::dto::{Goal, MealDay};

/// Coerce a free-form calorie string ("1800", "1,800", "1800 kcal") into a
/// positive integer. Returns `None` when no usable number is present.
pub fn coerce_calories_str(value: &str) -> Option<u32> {
    lazy_static! {
        static ref NUMBER_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
    }
    let cleaned = value.replace(',', "");
    let captured = NUMBER_RE.captures(&cleaned)?;
    let parsed: f64 = captured[1].parse().ok()?;
    round_positive(parsed)
}

/// Coerce any JSON value into a positive integer calorie figure. Total:
/// numbers are rounded, strings go through [`coerce_calories_str`], and
/// everything else is `None`.
pub fn coerce_calories(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => round_positive(n.as_f64()?),
        Value::String(s) => coerce_calories_str(s),
        _ => None,
    }
}

fn round_positive(n: f64) -> Option<u32> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    let rounded = n.round();
    // 0.4 rounds down to zero; a zero-calorie day is never usable.
    if rounded < 1.0 || rounded > u32::MAX as f64 {
        return None;
    }
    Some(rounded as u32)
}

/// Resolve the per-day default: an explicit caller target wins, otherwise
/// the goal-based constant.
pub fn plan_default(goal: Goal, calorie_target: Option<&str>) -> u32 {
    calorie_target
        .and_then(coerce_calories_str)
        .unwrap_or_else(|| goal.default_calories())
}

/// Fill in `calories` on every day of a raw generated plan. Accepts either
/// a bare array of days or an object carrying a `days` array; anything else
/// is left untouched.
pub fn hydrate_value(plan: &mut Value, default: u32) {
    match plan {
        Value::Array(days) => {
            for day in days {
                hydrate_day_value(day, default);
            }
        }
        Value::Object(map) => {
            if let Some(Value::Array(days)) = map.get_mut("days") {
                for day in days {
                    hydrate_day_value(day, default);
                }
            }
        }
        _ => {}
    }
}

fn hydrate_day_value(day: &mut Value, default: u32) {
    let Value::Object(map) = day else { return };
    let calories = map
        .get("calories")
        .and_then(coerce_calories)
        .unwrap_or(default);
    map.insert("calories".into(), Value::from(calories));
}

/// Typed counterpart of [`hydrate_value`] for already-normalized days.
pub fn hydrate_days(days: &mut [MealDay], default: u32) {
    for day in days {
        if day.calories.map_or(true, |c| c == 0) {
            day.calories = Some(default);
        }
    }
}
