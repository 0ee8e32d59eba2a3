use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use super::dto::PlanQuery;
use super::generation::GenerationError;
use super::prompt::PlanAttributes;
use super::services;
use crate::auth::AuthUser;
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/meal/generate", get(generate))
}

#[instrument(skip(state, query))]
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let attrs = PlanAttributes::from_query(&query);
    match services::generate_plan(&state, &attrs).await {
        Ok(plan) => Ok(Json(json!({ "plan": plan }))),
        Err(GenerationError::InvalidFormat { raw }) => {
            // Keep the offending text server-side for diagnosis; the client
            // only ever sees the static message.
            warn!(%user_id, raw = %raw, "model returned an unparseable plan");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Meal plan generation failed",
            ))
        }
        Err(e) => {
            error!(%user_id, error = %e, "meal plan generation error");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error while generating meal plan",
            ))
        }
    }
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}
