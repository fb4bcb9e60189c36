use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// OpenAI-compatible text generation. A missing key disables every AI feature.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseApiConfig {
    pub api_key: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub exercises: ExerciseApiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitjourney".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitjourney-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let ai = AiConfig {
            api_key: non_empty("OPENAI_API_KEY"),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            timeout_secs: parse_or("OPENAI_TIMEOUT_SECS", 15),
        };
        let exercises = ExerciseApiConfig {
            api_key: non_empty("API_NINJAS_KEY"),
            url: std::env::var("EXERCISE_API_URL")
                .unwrap_or_else(|_| "https://api.api-ninjas.com/v1/exercises".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            ai,
            exercises,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_missing_or_garbage() {
        assert_eq!(parse_or("FITJOURNEY_TEST_SURELY_UNSET", 42u64), 42);
        std::env::set_var("FITJOURNEY_TEST_GARBAGE_TIMEOUT", "soon");
        assert_eq!(parse_or("FITJOURNEY_TEST_GARBAGE_TIMEOUT", 15u64), 15);
        std::env::set_var("FITJOURNEY_TEST_PADDED_TIMEOUT", " 30 ");
        assert_eq!(parse_or("FITJOURNEY_TEST_PADDED_TIMEOUT", 15u64), 30);
    }

    #[test]
    fn blank_keys_count_as_missing() {
        std::env::set_var("FITJOURNEY_TEST_BLANK_KEY", "   ");
        assert_eq!(non_empty("FITJOURNEY_TEST_BLANK_KEY"), None);
        std::env::set_var("FITJOURNEY_TEST_REAL_KEY", "sk-abc");
        assert_eq!(non_empty("FITJOURNEY_TEST_REAL_KEY").as_deref(), Some("sk-abc"));
    }
}
