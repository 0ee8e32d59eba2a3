use serde_json::{json, Value};

/// Hand-authored 7-day plan shown when live generation is unavailable.
/// Static and parameterless so tests and the fallback banner stay
/// deterministic. Consumers run it through the same normalizer and hydrator
/// as generated plans.
pub fn sample_plan() -> Value {
    json!({
        "days": [
            {
                "day": "Day 1",
                "calories": 1850,
                "meals": {
                    "breakfast": ["Oatmeal with sliced banana", "Boiled egg"],
                    "lunch": ["Chicken tinola with malunggay", "Brown rice"],
                    "dinner": ["Grilled bangus", "Ensaladang talong"],
                    "snacks": ["Fresh mango"]
                }
            },
            {
                "day": "Day 2",
                "calories": 1800,
                "meals": {
                    "breakfast": ["Taho with less syrup", "Whole wheat pandesal"],
                    "lunch": ["Pinakbet with lean pork", "Brown rice"],
                    "dinner": ["Sinigang na hipon with kangkong"],
                    "snacks": ["Boiled saba banana"]
                }
            },
            {
                "day": "Day 3",
                "calories": 1900,
                "meals": {
                    "breakfast": ["Scrambled egg with tomato", "Adlai porridge"],
                    "lunch": ["Chicken adobo (skinless)", "Steamed pechay", "Brown rice"],
                    "dinner": ["Ginisang monggo with malunggay and tinapa flakes"],
                    "snacks": ["Papaya slices"]
                }
            },
            {
                "day": "Day 4",
                "calories": 1850,
                "meals": {
                    "breakfast": ["Champorado made with tablea and brown rice", "Low-fat milk"],
                    "lunch": ["Grilled tilapia", "Ensaladang mangga", "Brown rice"],
                    "dinner": ["Nilagang baka (lean cuts) with vegetables"],
                    "snacks": ["Fresh buko with its water"]
                }
            },
            {
                "day": "Day 5",
                "calories": 1800,
                "meals": {
                    "breakfast": ["Vegetable omelette", "Whole wheat pandesal"],
                    "lunch": ["Laing with less coconut cream", "Grilled chicken breast", "Brown rice"],
                    "dinner": ["Pesang isda with sayote tops"],
                    "snacks": ["Kamote cue (lightly sweetened)"]
                }
            },
            {
                "day": "Day 6",
                "calories": 1900,
                "meals": {
                    "breakfast": ["Arroz caldo with chicken breast and ginger"],
                    "lunch": ["Ginataang gulay with shrimp", "Adlai"],
                    "dinner": ["Inihaw na liempo (trimmed)", "Atchara", "Brown rice"],
                    "snacks": ["Pineapple chunks"]
                }
            },
            {
                "day": "Day 7",
                "calories": 1850,
                "meals": {
                    "breakfast": ["Daing na bangus (baked)", "Garlic brown rice", "Sliced tomato"],
                    "lunch": ["Chopsuey with chicken", "Brown rice"],
                    "dinner": ["Tinolang isda with papaya and chili leaves"],
                    "snacks": ["Turon made with oats wrapper", "Calamansi juice, unsweetened"]
                }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::dto::Goal;
    use crate::plan::hydrate::{hydrate_days, plan_default};
    use crate::plan::normalize::normalize_plan;

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(sample_plan(), sample_plan());
    }

    #[test]
    fn fallback_satisfies_the_plan_invariants() {
        let mut days = normalize_plan(&sample_plan());
        assert_eq!(days.len(), 7);
        hydrate_days(&mut days, plan_default(Goal::Maintain, None));
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.day, format!("Day {}", i + 1));
            assert!(day.calories.expect("hydrated") > 0);
            assert!(!day.meals.breakfast.is_empty());
            assert!(!day.meals.lunch.is_empty());
            assert!(!day.meals.dinner.is_empty());
            assert!(!day.meals.snacks.is_empty());
        }
    }
}
