//! Consumer side of the plan contract: fetches a plan from the API, treats
//! the payload as untrusted, and reshapes it through the shared normalizer
//! and hydrator. Session expiry and service failure are kept apart: only
//! the latter falls back to the sample plan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::plan::dto::{Goal, MealDay, PlanQuery};
use crate::plan::fallback::sample_plan;
use crate::plan::hydrate::{hydrate_days, plan_default};
use crate::plan::normalize::normalize_plan;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// 401 from the API: the session expired.
    #[error("session expired")]
    Unauthorized,
    /// Network error or any non-401 failure status.
    #[error("plan service unavailable: {0}")]
    Service(String),
}

/// Transport seam so the session can be exercised without a live server.
#[async_trait]
pub trait PlanTransport: Send + Sync {
    async fn fetch_plan(&self, token: &str, query: &PlanQuery) -> Result<Value, FetchError>;
}

pub struct HttpPlanTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPlanTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PlanTransport for HttpPlanTransport {
    async fn fetch_plan(&self, token: &str, query: &PlanQuery) -> Result<Value, FetchError> {
        let url = format!("{}/api/meal/generate", self.base_url);
        let params: Vec<(&str, &str)> = [
            ("goal", query.goal.as_deref()),
            ("dietary_preference", query.dietary_preference.as_deref()),
            ("allergies", query.allergies.as_deref()),
            ("food_preferences", query.food_preferences.as_deref()),
            ("risky_foods", query.risky_foods.as_deref()),
            ("body_type", query.body_type.as_deref()),
            ("body_goal", query.body_goal.as_deref()),
            ("calorie_target", query.calorie_target.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        let response = self
            .http
            .get(&url)
            .query(&params)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FetchError::Service(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            return Err(FetchError::Service(format!("status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Service(e.to_string()))?;
        // The plan lives under "plan", but the body itself is accepted too.
        Ok(body.get("plan").cloned().unwrap_or(body))
    }
}

pub const FALLBACK_NOTICE: &str =
    "Showing a sample plan because the meal service was unreachable.";

/// What the UI renders after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanView {
    /// Nothing fetched yet.
    Empty,
    /// No token present; generation is skipped and no fallback is shown.
    LoginRequired,
    /// The API said 401; the plan is cleared until the user logs in again.
    SessionExpired,
    Ready {
        days: Vec<MealDay>,
        notice: Option<&'static str>,
    },
}

/// One plan fetch per parameter change, latest request wins: every refresh
/// takes a new generation number and a resolution may only commit if no
/// newer refresh has started since.
pub struct PlanSession {
    transport: Arc<dyn PlanTransport>,
    generation: AtomicU64,
    state: Mutex<Committed>,
}

struct Committed {
    generation: u64,
    view: PlanView,
}

impl PlanSession {
    pub fn new(transport: Arc<dyn PlanTransport>) -> Self {
        Self {
            transport,
            generation: AtomicU64::new(0),
            state: Mutex::new(Committed {
                generation: 0,
                view: PlanView::Empty,
            }),
        }
    }

    pub fn current(&self) -> PlanView {
        self.state.lock().expect("plan state lock").view.clone()
    }

    /// Fetch and commit a fresh view for the given parameters. Returns the
    /// view this call produced, which may already have been superseded.
    pub async fn refresh(&self, token: Option<&str>, query: &PlanQuery) -> PlanView {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let view = match token {
            None => PlanView::LoginRequired,
            Some(token) => match self.transport.fetch_plan(token, query).await {
                Ok(payload) => PlanView::Ready {
                    days: reshape(&payload, query),
                    notice: None,
                },
                Err(FetchError::Unauthorized) => PlanView::SessionExpired,
                Err(FetchError::Service(reason)) => {
                    warn!(%reason, "plan fetch failed; falling back to sample plan");
                    PlanView::Ready {
                        days: reshape(&sample_plan(), query),
                        notice: Some(FALLBACK_NOTICE),
                    }
                }
            },
        };

        self.commit(generation, view.clone());
        view
    }

    fn commit(&self, generation: u64, view: PlanView) {
        let mut state = self.state.lock().expect("plan state lock");
        if generation < state.generation {
            debug!(generation, committed = state.generation, "stale plan result dropped");
            return;
        }
        state.generation = generation;
        state.view = view;
    }
}

/// Shared reshaping contract: normalize whatever arrived, then hydrate
/// calories, so fallback and generated plans are indistinguishable.
fn reshape(payload: &Value, query: &PlanQuery) -> Vec<MealDay> {
    let mut days = normalize_plan(payload);
    let goal = Goal::parse(query.goal.as_deref());
    hydrate_days(&mut days, plan_default(goal, query.calorie_target.as_deref()));
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CannedTransport {
        result: Result<Value, FetchError>,
        calls: AtomicUsize,
    }

    impl CannedTransport {
        fn new(result: Result<Value, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PlanTransport for CannedTransport {
        async fn fetch_plan(&self, _token: &str, _query: &PlanQuery) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn one_day_payload() -> Value {
        json!({ "days": [{
            "day": "Day 1",
            "calories": 1750,
            "meals": { "breakfast": ["Lugaw"], "lunch": [], "dinner": ["Tinola"], "snacks": [] }
        }]})
    }

    #[tokio::test]
    async fn successful_fetch_commits_normalized_days() {
        let transport = CannedTransport::new(Ok(one_day_payload()));
        let session = PlanSession::new(transport.clone());

        let view = session.refresh(Some("token"), &PlanQuery::default()).await;
        let PlanView::Ready { days, notice } = view else {
            panic!("expected Ready");
        };
        assert!(notice.is_none());
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].calories, Some(1750));
        assert_eq!(session.current(), session.current());
    }

    #[tokio::test]
    async fn missing_token_skips_the_transport_and_the_fallback() {
        let transport = CannedTransport::new(Ok(one_day_payload()));
        let session = PlanSession::new(transport.clone());

        let view = session.refresh(None, &PlanQuery::default()).await;
        assert_eq!(view, PlanView::LoginRequired);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unauthorized_clears_the_plan_without_fallback() {
        let transport = CannedTransport::new(Err(FetchError::Unauthorized));
        let session = PlanSession::new(transport);

        let view = session.refresh(Some("expired"), &PlanQuery::default()).await;
        assert_eq!(view, PlanView::SessionExpired);
        assert_eq!(session.current(), PlanView::SessionExpired);
    }

    #[tokio::test]
    async fn service_failure_shows_the_sample_plan_with_a_notice() {
        let transport = CannedTransport::new(Err(FetchError::Service("status 500".into())));
        let session = PlanSession::new(transport);

        let query = PlanQuery {
            goal: Some("gain".into()),
            ..Default::default()
        };
        let view = session.refresh(Some("token"), &query).await;
        let PlanView::Ready { days, notice } = view else {
            panic!("expected fallback Ready");
        };
        assert_eq!(notice, Some(FALLBACK_NOTICE));
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| d.calories.unwrap_or(0) > 0));
    }

    struct SlowTransport {
        delay: Duration,
        payload: Value,
    }

    #[async_trait]
    impl PlanTransport for SlowTransport {
        async fn fetch_plan(&self, _token: &str, _query: &PlanQuery) -> Result<Value, FetchError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.payload.clone())
        }
    }

    #[tokio::test]
    async fn a_stale_result_never_overwrites_a_newer_one() {
        let slow = Arc::new(SlowTransport {
            delay: Duration::from_millis(150),
            payload: json!({ "days": [{ "day": "Stale day" }] }),
        });
        let session = Arc::new(PlanSession::new(slow));

        let first = {
            let session = session.clone();
            tokio::spawn(async move {
                session.refresh(Some("token"), &PlanQuery::default()).await
            })
        };
        // Give the first refresh time to claim its generation number.
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Newer request resolves immediately: no token, so no transport hit.
        let newer = session.refresh(None, &PlanQuery::default()).await;
        assert_eq!(newer, PlanView::LoginRequired);

        // The slow first request finishes afterwards but must not commit.
        let stale = first.await.expect("join");
        assert!(matches!(stale, PlanView::Ready { .. }));
        assert_eq!(session.current(), PlanView::LoginRequired);
    }
}
