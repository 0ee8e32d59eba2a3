use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::prompt::PromptPayload;
use crate::config::GenerationConfig;

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Network/auth/rate-limit failure from the upstream service.
    #[error("generation service failed: {0}")]
    Upstream(String),
    /// The upstream call exceeded the configured deadline.
    #[error("generation service timed out")]
    Timeout,
    /// The service answered, but its output could not be read as a plan.
    /// The raw text is kept for server-side diagnostics only.
    #[error("model output did not match the plan format")]
    InvalidFormat { raw: String },
}

/// Strict output contract declared to the generation service: exactly seven
/// days, bounded calories, the four fixed meal arrays, nothing else.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "required": ["days"],
        "additionalProperties": false,
        "properties": {
            "days": {
                "type": "array",
                "minItems": 7,
                "maxItems": 7,
                "items": {
                    "type": "object",
                    "required": ["day", "calories", "meals"],
                    "additionalProperties": false,
                    "properties": {
                        "day": { "type": "string" },
                        "calories": { "type": "number", "minimum": 800, "maximum": 4000 },
                        "meals": {
                            "type": "object",
                            "required": ["breakfast", "lunch", "dinner", "snacks"],
                            "additionalProperties": false,
                            "properties": {
                                "breakfast": { "type": "array", "items": { "type": "string" } },
                                "lunch": { "type": "array", "items": { "type": "string" } },
                                "dinner": { "type": "array", "items": { "type": "string" } },
                                "snacks": { "type": "array", "items": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Capability boundary to the structured-generation service. The concrete
/// provider is swappable without touching the hydrator or normalizer.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Returns the best-effort plan value: either a `{days: [...]}` object
    /// or a bare array of days.
    async fn generate(
        &self,
        prompt: &PromptPayload,
        schema: &Value,
    ) -> Result<Value, GenerationError>;
}

/// Strip a ```/```json code fence (with stray whitespace) if present.
pub fn strip_code_fence(text: &str) -> &str {
    lazy_static! {
        static ref FENCE_RE: Regex =
            Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap();
    }
    match FENCE_RE.captures(text) {
        Some(caps) => caps.get(1).map_or(text, |m| m.as_str()),
        None => text.trim(),
    }
}

/// Parse raw model text into a plan-shaped value: a bare array of days or an
/// object with a `days` key. Anything else is rejected.
pub fn parse_plan_text(raw: &str) -> Option<Value> {
    let candidate = strip_code_fence(raw);
    let parsed: Value = serde_json::from_str(candidate).ok()?;
    match &parsed {
        Value::Array(_) => Some(parsed),
        Value::Object(map) if map.get("days").map_or(false, Value::is_array) => Some(parsed),
        _ => None,
    }
}

/// `parsed.days` when present, otherwise the value itself.
pub fn extract_days(value: Value) -> Value {
    match value {
        Value::Object(mut map) => map.remove("days").unwrap_or(Value::Object(map)),
        other => other,
    }
}

// --- OpenAI-compatible chat-completions provider ---

pub struct OpenAiGenerator {
    http: reqwest::Client,
    config: GenerationConfig,
}

// These model families reject a custom temperature; leave it off for them.
fn model_supports_temperature(model: &str) -> bool {
    lazy_static! {
        static ref NO_TEMP_RE: Regex =
            Regex::new(r"(?i)^(gpt-5|gpt-4o(\b|-)|o4(\b|-)|gpt-4\.1)").unwrap();
    }
    !NO_TEMP_RE.is_match(model)
}

impl OpenAiGenerator {
    pub fn new(config: GenerationConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn request_body(&self, prompt: &PromptPayload, schema: &Value) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "weekly_meal_plan",
                    "schema": schema,
                    "strict": true
                }
            }
        });
        if let Some(t) = self.config.temperature {
            if model_supports_temperature(&self.config.model) {
                body["temperature"] = json!(t);
            }
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/chat/completions", self.config.base_url);
        self.http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
    }

    async fn call(&self, body: &Value) -> Result<ChatMessage, GenerationError> {
        // One retry on a transient transport failure. Parse and schema
        // problems surface above this layer and are never retried: the
        // same prompt would just come back malformed again.
        let response = match self.send(body).await {
            Ok(r) => r,
            Err(e) if e.is_timeout() || e.is_connect() => {
                debug!(error = %e, "retrying generation call once");
                self.send(body).await.map_err(map_transport_error)?
            }
            Err(e) => return Err(map_transport_error(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(%status, body = %error_body, "generation service error");
            return Err(GenerationError::Upstream(format!("status {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Upstream(format!("unreadable response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| GenerationError::Upstream("response had no choices".into()))
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Upstream(e.to_string())
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerator {
    async fn generate(
        &self,
        prompt: &PromptPayload,
        schema: &Value,
    ) -> Result<Value, GenerationError> {
        let body = self.request_body(prompt, schema);
        let message = self.call(&body).await?;
        interpret_message(message)
    }
}

/// Primary path: a pre-parsed structured object. Secondary path: raw text,
/// fence-stripped and JSON-parsed. Otherwise the raw text is surfaced as an
/// explicit failure marker.
pub fn interpret_message(message: ChatMessage) -> Result<Value, GenerationError> {
    if let Some(parsed) = message.parsed {
        if parsed.is_object() || parsed.is_array() {
            return Ok(parsed);
        }
    }

    let raw = message.content.map(|c| c.flatten()).unwrap_or_default();
    match parse_plan_text(&raw) {
        Some(value) => Ok(value),
        None => Err(GenerationError::InvalidFormat { raw }),
    }
}

// --- chat-completions response DTOs ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub parsed: Option<Value>,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Content arrives either as one string or as a list of typed parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Typed { text: String },
    Plain(String),
    Other(Value),
}

impl MessageContent {
    fn flatten(self) -> String {
        match self {
            MessageContent::Text(s) => s.trim().to_string(),
            MessageContent::Parts(parts) => parts
                .into_iter()
                .map(|p| match p {
                    ContentPart::Typed { text } => text,
                    ContentPart::Plain(s) => s,
                    ContentPart::Other(_) => String::new(),
                })
                .collect::<String>()
                .trim()
                .to_string(),
        }
    }
}
