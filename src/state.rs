use std::sync::Arc;

use crate::config::AppConfig;
use crate::plan::generation::{GenerationClient, OpenAiGenerator};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: Arc<dyn GenerationClient>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let generator =
            Arc::new(OpenAiGenerator::new(config.generation.clone())?) as Arc<dyn GenerationClient>;
        Ok(Self { config, generator })
    }

    pub fn from_parts(config: Arc<AppConfig>, generator: Arc<dyn GenerationClient>) -> Self {
        Self { config, generator }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_jwt("test", "test", "test")
    }

    /// State wired to a canned generator; no network, no env vars.
    #[cfg(test)]
    pub fn fake_with_jwt(secret: &str, issuer: &str, audience: &str) -> Self {
        use crate::plan::generation::GenerationError;
        use crate::plan::prompt::PromptPayload;
        use async_trait::async_trait;
        use serde_json::{json, Value};

        struct FakeGenerator;

        #[async_trait]
        impl GenerationClient for FakeGenerator {
            async fn generate(
                &self,
                _prompt: &PromptPayload,
                _schema: &Value,
            ) -> Result<Value, GenerationError> {
                let mut days = Vec::new();
                for i in 1..=7 {
                    // Day 4 ships without calories so hydration paths stay covered.
                    let calories = if i == 4 { Value::Null } else { json!(1600 + i * 50) };
                    days.push(json!({
                        "day": format!("Day {i}"),
                        "calories": calories,
                        "meals": {
                            "breakfast": ["Oatmeal"],
                            "lunch": ["Tinola"],
                            "dinner": ["Sinigang"],
                            "snacks": ["Banana"]
                        }
                    }));
                }
                Ok(json!({ "days": days }))
            }
        }

        Self {
            config: Arc::new(Self::fake_config(secret, issuer, audience)),
            generator: Arc::new(FakeGenerator) as Arc<dyn GenerationClient>,
        }
    }

    /// State whose generator always fails with the given error.
    #[cfg(test)]
    pub fn fake_failing(error: crate::plan::generation::GenerationError) -> Self {
        use crate::plan::generation::GenerationError;
        use crate::plan::prompt::PromptPayload;
        use async_trait::async_trait;
        use serde_json::Value;

        struct FailingGenerator(GenerationError);

        #[async_trait]
        impl GenerationClient for FailingGenerator {
            async fn generate(
                &self,
                _prompt: &PromptPayload,
                _schema: &Value,
            ) -> Result<Value, GenerationError> {
                Err(self.0.clone())
            }
        }

        Self {
            config: Arc::new(Self::fake_config("test", "test", "test")),
            generator: Arc::new(FailingGenerator(error)) as Arc<dyn GenerationClient>,
        }
    }

    #[cfg(test)]
    fn fake_config(secret: &str, issuer: &str, audience: &str) -> AppConfig {
        use crate::config::{GenerationConfig, JwtConfig};

        AppConfig {
            jwt: JwtConfig {
                secret: secret.into(),
                issuer: issuer.into(),
                audience: audience.into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            generation: GenerationConfig {
                api_key: "test-key".into(),
                model: "gpt-5".into(),
                base_url: "http://localhost:0".into(),
                temperature: None,
                timeout_secs: 1,
            },
        }
    }
}
