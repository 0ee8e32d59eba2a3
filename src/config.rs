use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f64>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
}

const DEFAULT_MODEL: &str = "gpt-5";

/// Accepts sloppy spellings like "gpt=5", "GPT 5" or "gpt5".
pub fn normalize_model(name: &str) -> Option<String> {
    let n = name.trim().to_lowercase();
    if n.is_empty() {
        return None;
    }
    if n == "gpt=5" || n == "gpt5" || n == "gpt 5" {
        return Some("gpt-5".to_string());
    }
    Some(n)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutriplan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutriplan-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let generation = GenerationConfig {
            api_key: std::env::var("OPENAI_API_KEY")?,
            model: std::env::var("OPENAI_MODEL")
                .ok()
                .and_then(|v| normalize_model(&v))
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok()),
            timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };
        Ok(Self { jwt, generation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_variants_normalize_to_canonical() {
        assert_eq!(normalize_model("gpt=5").as_deref(), Some("gpt-5"));
        assert_eq!(normalize_model("GPT 5").as_deref(), Some("gpt-5"));
        assert_eq!(normalize_model("gpt5").as_deref(), Some("gpt-5"));
        assert_eq!(normalize_model("GPT-4o-mini").as_deref(), Some("gpt-4o-mini"));
        assert_eq!(normalize_model("   "), None);
    }
}
