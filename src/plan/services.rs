use serde_json::Value;

use super::generation::{extract_days, plan_schema, GenerationError};
use super::hydrate::{hydrate_value, plan_default};
use super::prompt::{build_prompt, PlanAttributes};
use crate::state::AppState;

/// Normalize the request, run the generation call, and hydrate calories.
/// The returned value is the plan's day array (or, for a days-less object
/// from the secondary parse path, the object as-is).
pub async fn generate_plan(
    state: &AppState,
    attrs: &PlanAttributes,
) -> Result<Value, GenerationError> {
    let prompt = build_prompt(attrs);
    let schema = plan_schema();
    let value = state.generator.generate(&prompt, &schema).await?;

    let mut plan = extract_days(value);
    let default = plan_default(attrs.goal, attrs.calorie_target.as_deref());
    hydrate_value(&mut plan, default);
    Ok(plan)
}
