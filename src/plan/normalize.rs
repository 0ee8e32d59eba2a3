use serde_json::Value;

use super::dto::{MealDay, Meals};
use super::hydrate::coerce_calories;

/// The top-level shapes a plan payload is allowed to arrive in, checked in
/// this order. Everything unrecognized normalizes to an empty plan.
#[derive(Debug)]
enum PlanShape<'a> {
    DaysField(&'a [Value]),
    NestedPlan(&'a [Value]),
    BareArray(&'a [Value]),
    SingleDay(&'a Value),
    Empty,
}

fn classify(value: &Value) -> PlanShape<'_> {
    if let Some(days) = value.get("days").and_then(Value::as_array) {
        return PlanShape::DaysField(days);
    }
    if let Some(days) = value
        .get("plan")
        .and_then(|p| p.get("days"))
        .and_then(Value::as_array)
    {
        return PlanShape::NestedPlan(days);
    }
    if let Some(days) = value.as_array() {
        return PlanShape::BareArray(days);
    }
    if value.is_object() {
        return PlanShape::SingleDay(value);
    }
    PlanShape::Empty
}

/// Reshape whatever plan JSON the server (or fallback data) produced into a
/// uniform day sequence. Total: malformed input yields placeholder days or
/// an empty vec, never an error. Idempotent: feeding the serialized output
/// back in reproduces it.
pub fn normalize_plan(value: &Value) -> Vec<MealDay> {
    let days: Vec<&Value> = match classify(value) {
        PlanShape::DaysField(days)
        | PlanShape::NestedPlan(days)
        | PlanShape::BareArray(days) => days.iter().collect(),
        PlanShape::SingleDay(day) => vec![day],
        PlanShape::Empty => return Vec::new(),
    };
    days.iter()
        .enumerate()
        .map(|(index, day)| normalize_day(day, index))
        .collect()
}

fn normalize_day(entry: &Value, index: usize) -> MealDay {
    let placeholder_title = format!("Day {}", index + 1);

    let Some(map) = entry.as_object() else {
        return MealDay {
            day: placeholder_title,
            calories: None,
            meals: Meals::default(),
        };
    };

    let day = map
        .get("day")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or(placeholder_title);

    // Some plans nest the four slots under "meals", others put them at the
    // top level of the day object.
    let source = match map.get("meals") {
        Some(meals) if meals.is_object() => meals,
        _ => entry,
    };

    MealDay {
        day,
        calories: map.get("calories").and_then(|v| coerce_calories(v)),
        meals: Meals {
            breakfast: meal_list(source.get("breakfast")),
            lunch: meal_list(source.get("lunch")),
            dinner: meal_list(source.get("dinner")),
            snacks: meal_list(source.get("snacks")),
        },
    }
}

/// Coerce one meal slot into a list of non-empty strings.
///
/// A single string is split on newlines and commas; that deliberately turns
/// prose like "Rice, egg, and coffee" into three items, matching the
/// established plan format.
pub fn meal_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s
            .split(|c| c == '\n' || c == ',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
        // Zero and false count as absent values, not content.
        Some(Value::Bool(false)) => Vec::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Vec::new(),
        Some(other) => scalar_text(other).map_or_else(Vec::new, |s| vec![s]),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_day() -> Value {
        json!({
            "day": "Day 1",
            "calories": 1850,
            "meals": {
                "breakfast": ["Oatmeal with berries"],
                "lunch": ["Grilled bangus salad"],
                "dinner": ["Chicken tinola with brown rice"],
                "snacks": ["Banana"]
            }
        })
    }

    #[test]
    fn accepted_shapes_produce_equivalent_days() {
        let day = sample_day();
        let from_days = normalize_plan(&json!({ "days": [day.clone()] }));
        let from_nested = normalize_plan(&json!({ "plan": { "days": [day.clone()] } }));
        let from_array = normalize_plan(&json!([day.clone()]));
        let from_single = normalize_plan(&day);

        assert_eq!(from_days, from_nested);
        assert_eq!(from_days, from_array);
        assert_eq!(from_days, from_single);
        assert_eq!(from_days[0].day, "Day 1");
        assert_eq!(from_days[0].calories, Some(1850));
        assert_eq!(from_days[0].meals.lunch, vec!["Grilled bangus salad"]);
    }

    #[test]
    fn unrecognized_payloads_normalize_to_empty() {
        assert!(normalize_plan(&Value::Null).is_empty());
        assert!(normalize_plan(&json!("whoops")).is_empty());
        assert!(normalize_plan(&json!(42)).is_empty());
    }

    // An object whose "days" is not an array falls through the shape checks
    // and is treated as a single (here: meal-less) day.
    #[test]
    fn object_with_non_array_days_is_one_placeholder_day() {
        let days = normalize_plan(&json!({ "days": "not an array" }));
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day, "Day 1");
        assert_eq!(days[0].calories, None);
        assert_eq!(days[0].meals, Meals::default());
    }

    #[test]
    fn non_object_entries_become_placeholder_days() {
        let days = normalize_plan(&json!([null, "garbage", sample_day()]));
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day, "Day 1");
        assert_eq!(days[0].meals, Meals::default());
        assert_eq!(days[1].day, "Day 2");
        assert_eq!(days[2].day, "Day 1"); // keeps its own title
    }

    #[test]
    fn missing_day_title_falls_back_to_index() {
        let days = normalize_plan(&json!([{ "calories": 1700 }, { "day": "  " }]));
        assert_eq!(days[0].day, "Day 1");
        assert_eq!(days[1].day, "Day 2");
    }

    #[test]
    fn top_level_meal_keys_are_supported() {
        let days = normalize_plan(&json!([{
            "day": "Day 1",
            "breakfast": ["Taho"],
            "lunch": "Pinakbet with rice",
            "dinner": [],
            "snacks": null
        }]));
        assert_eq!(days[0].meals.breakfast, vec!["Taho"]);
        assert_eq!(days[0].meals.lunch, vec!["Pinakbet with rice"]);
        assert!(days[0].meals.dinner.is_empty());
        assert!(days[0].meals.snacks.is_empty());
    }

    #[test]
    fn arrays_are_filtered_not_split() {
        let value = json!(["  Adobo, rice  ", "", "   ", 95, true]);
        assert_eq!(
            meal_list(Some(&value)),
            vec!["Adobo, rice", "95", "true"]
        );
    }

    // Compatibility: a bare string splits on commas even when the comma is
    // prose punctuation rather than a list separator.
    #[test]
    fn single_string_splits_on_commas_even_inside_prose() {
        let value = json!("Rice, egg, and coffee");
        assert_eq!(meal_list(Some(&value)), vec!["Rice", "egg", "and coffee"]);
    }

    #[test]
    fn single_string_splits_on_newlines_too() {
        let value = json!("Lugaw\nBoiled egg\n");
        assert_eq!(meal_list(Some(&value)), vec!["Lugaw", "Boiled egg"]);
    }

    #[test]
    fn other_scalars_wrap_as_single_items() {
        assert_eq!(meal_list(Some(&json!(3))), vec!["3"]);
        assert!(meal_list(Some(&json!({"oops": true}))).is_empty());
        assert!(meal_list(None).is_empty());
    }

    #[test]
    fn falsy_scalars_normalize_to_empty() {
        assert!(meal_list(Some(&json!(false))).is_empty());
        assert!(meal_list(Some(&json!(0))).is_empty());
        assert!(meal_list(Some(&json!(0.0))).is_empty());
        assert!(meal_list(Some(&json!(""))).is_empty());
        assert!(meal_list(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let messy = json!({
            "plan": {
                "days": [
                    { "day": "Day 1", "calories": "1,800 kcal", "meals": { "breakfast": "Rice, egg" } },
                    "broken entry",
                    { "lunch": ["Sinigang"], "calories": null }
                ]
            }
        });
        let once = normalize_plan(&messy);
        let reserialized = serde_json::to_value(&once).expect("serialize");
        let twice = normalize_plan(&reserialized);
        assert_eq!(once, twice);
    }
}
