use crate::locale::Locale;
use serde::Deserialize;

/// Default public CNPJ registry (CNPJá open API).
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://open.cnpja.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SECTOR_DOMAIN: &str = "education";
pub const DEFAULT_SECTOR_DOMAIN_EXAMPLES: &str =
    "schools, courses, training centers, universities, e-learning, tutoring";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub registry_base_url: String,
    pub registry_timeout_secs: u64,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub reasoning_timeout_secs: u64,
    pub locale: Locale,
    pub sector_domain: String,
    pub sector_domain_examples: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            registry_base_url: base_url_var("REGISTRY_BASE_URL", DEFAULT_REGISTRY_BASE_URL)?,
            registry_timeout_secs: parse_secs("REGISTRY_TIMEOUT_SECS", 30)?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("OPENAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            openai_base_url: base_url_var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            llm_model: std::env::var("LLM_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_temperature: std::env::var("LLM_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("LLM_TEMPERATURE must be a number"))
                .and_then(|t| {
                    if !(0.0..=2.0).contains(&t) {
                        anyhow::bail!("LLM_TEMPERATURE must be between 0.0 and 2.0");
                    }
                    Ok(t)
                })?,
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LLM_MAX_TOKENS must be a positive integer"))?,
            reasoning_timeout_secs: parse_secs("REASONING_TIMEOUT_SECS", 60)?,
            locale: std::env::var("ANALYSIS_LOCALE")
                .unwrap_or_else(|_| "pt-BR".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("ANALYSIS_LOCALE: {}", e))?,
            sector_domain: std::env::var("SECTOR_DOMAIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SECTOR_DOMAIN.to_string()),
            sector_domain_examples: std::env::var("SECTOR_DOMAIN_EXAMPLES")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SECTOR_DOMAIN_EXAMPLES.to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Registry Base URL: {}", config.registry_base_url);
        tracing::debug!(
            "Reasoning backend: {} (model {}, temperature {})",
            config.openai_base_url,
            config.llm_model,
            config.llm_temperature
        );
        tracing::debug!(
            "Timeouts: registry {}s, reasoning {}s",
            config.registry_timeout_secs,
            config.reasoning_timeout_secs
        );
        tracing::debug!("Locale: {}, sector domain: {}", config.locale, config.sector_domain);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn parse_secs(var: &str, default: u64) -> anyhow::Result<u64> {
    let secs: u64 = std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", var))?;
    if secs == 0 {
        anyhow::bail!("{} must be greater than zero", var);
    }
    Ok(secs)
}

/// Reads an http(s) base URL, falling back to `default`. Trailing slashes are trimmed.
fn base_url_var(var: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(var).unwrap_or_else(|_| default.to_string());
    let url = url.trim();
    validate_http_url(url).map_err(|e| anyhow::anyhow!("{} {}", var, e))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Checks that `raw` is a non-empty, parseable http(s) URL.
pub fn validate_http_url(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Err("cannot be empty".to_string());
    }
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err("must start with http:// or https://".to_string());
    }
    url::Url::parse(raw).map_err(|e| format!("is not a valid URL: {}", e))?;
    Ok(())
}
