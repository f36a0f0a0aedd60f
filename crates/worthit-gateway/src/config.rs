//! Startup configuration sourced from environment variables.
//!
//! Every field here is required; a missing or malformed variable is a fatal
//! `Config` error, which `main` turns into exit code 1.

use worthit_core::CoreError;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub redis_url: String,
    pub redis_ssl: bool,
    pub api_host: String,
    pub telegram_token: String,
    pub apify_token: String,
    pub hf_token: String,
    pub allowed_origin: String,
}

impl GatewayConfig {
    /// Reads all required variables, collecting every missing one into a
    /// single `Config` error instead of failing on the first.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut missing = Vec::new();
        let required = |name: &'static str, missing: &mut Vec<&'static str>| -> String {
            std::env::var(name).unwrap_or_else(|_| {
                missing.push(name);
                String::new()
            })
        };

        let redis_url = required("REDIS_URL", &mut missing);
        let redis_ssl_raw = required("REDIS_SSL", &mut missing);
        let api_host = required("API_HOST", &mut missing);
        let telegram_token = required("TELEGRAM_TOKEN", &mut missing);
        let apify_token = required("APIFY_TOKEN", &mut missing);
        let hf_token = required("HF_TOKEN", &mut missing);
        let allowed_origin = required("ALLOWED_ORIGIN", &mut missing);

        if !missing.is_empty() {
            return Err(CoreError::Config {
                message: format!("missing required environment variable(s): {}", missing.join(", ")),
            });
        }

        let redis_ssl = match redis_ssl_raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(CoreError::Config {
                    message: format!("REDIS_SSL must be a boolean, got '{other}'"),
                })
            }
        };

        Ok(Self {
            redis_url,
            redis_ssl,
            api_host,
            telegram_token,
            apify_token,
            hf_token,
            allowed_origin,
        })
    }
}
