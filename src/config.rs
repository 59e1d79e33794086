use std::time::Duration;

use crate::errors::ConfigError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ORDER_TTL_SECS: u64 = 3600;
const DEFAULT_ACK_TIMEOUT_MS: u64 = 2000;

/// Default step lifetime, as a multiple of the order TTL.
pub const STEP_TTL_FACTOR: u32 = 24;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_chat_id: i64,
    pub external_url: Option<String>,
    pub port: u16,
    pub redis_url: Option<String>,
    pub webhook_path: String,
    pub order_ttl: Duration,
    pub step_ttl: Duration,
    pub ack_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admin_raw = get("TELEGRAM_ADMIN_ID").ok_or(ConfigError::Missing("TELEGRAM_ADMIN_ID"))?;
        let admin_chat_id = parse_number("TELEGRAM_ADMIN_ID", &admin_raw)?;

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let order_ttl = match get("ORDER_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_number("ORDER_TTL_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_ORDER_TTL_SECS),
        };
        let step_ttl = match get("STEP_TTL_SECS") {
            Some(raw) => {
                let step_ttl = Duration::from_secs(parse_number("STEP_TTL_SECS", &raw)?);
                if step_ttl < order_ttl {
                    return Err(ConfigError::Invalid {
                        name: "STEP_TTL_SECS",
                        value: raw,
                    });
                }
                step_ttl
            }
            None => order_ttl.saturating_mul(STEP_TTL_FACTOR),
        };
        let ack_timeout = match get("ACK_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("ACK_TIMEOUT_MS", &raw)?),
            None => Duration::from_millis(DEFAULT_ACK_TIMEOUT_MS),
        };

        let webhook_path = get("WEBHOOK_SECRET_PATH")
            .map(|p| p.trim_matches('/').to_string())
            .unwrap_or_else(|| bot_token.clone());
        if !is_literal_route(&webhook_path) {
            // the default path is the token, keep it out of the error
            let value = if webhook_path == bot_token {
                "<bot token>".to_string()
            } else {
                webhook_path
            };
            return Err(ConfigError::Invalid {
                name: "WEBHOOK_SECRET_PATH",
                value,
            });
        }

        Ok(Self {
            bot_token,
            admin_chat_id,
            external_url: get("RENDER_EXTERNAL_URL"),
            port,
            redis_url: get("REDIS_URL"),
            webhook_path,
            order_ttl,
            step_ttl,
            ack_timeout,
        })
    }

    /// Full URL registered with Telegram, if a public base URL is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.external_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), self.webhook_path))
    }
}

/// The path is mounted as an axum route, so it must not read as a capture
/// (`:id`, `*rest`, `{id}`) or contain empty segments.
fn is_literal_route(path: &str) -> bool {
    path.split('/').all(|segment| {
        !segment.is_empty()
            && !segment.starts_with(':')
            && !segment.starts_with('*')
            && !segment.contains(['{', '}'])
    })
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = config_from(&[("TELEGRAM_ADMIN_ID", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn test_missing_admin_is_fatal() {
        let err = config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_ADMIN_ID")));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_ADMIN_ID", "-100500"),
        ])
        .unwrap();

        assert_eq!(config.admin_chat_id, -100500);
        assert_eq!(config.port, 5000);
        assert_eq!(config.order_ttl, Duration::from_secs(3600));
        assert_eq!(config.step_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.ack_timeout, Duration::from_millis(2000));
        assert_eq!(config.webhook_path, "123:abc");
        assert!(config.redis_url.is_none());
        assert!(config.webhook_url().is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_ADMIN_ID", "1"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_webhook_url_joins_base_and_path() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_ADMIN_ID", "1"),
            ("RENDER_EXTERNAL_URL", "https://ykk.onrender.com/"),
            ("WEBHOOK_SECRET_PATH", "/hook-secret/"),
        ])
        .unwrap();

        assert_eq!(
            config.webhook_url().as_deref(),
            Some("https://ykk.onrender.com/hook-secret")
        );
    }

    #[test]
    fn test_step_ttl_shorter_than_order_ttl_is_invalid() {
        let err = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_ADMIN_ID", "1"),
            ("ORDER_TTL_SECS", "600"),
            ("STEP_TTL_SECS", "60"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STEP_TTL_SECS", .. }));
    }

    #[test]
    fn test_route_like_webhook_path_is_invalid() {
        for path in [":secret", "hook/*rest", "{secret}", "a/x{y}", "a//b"] {
            let err = config_from(&[
                ("TELEGRAM_BOT_TOKEN", "123:abc"),
                ("TELEGRAM_ADMIN_ID", "1"),
                ("WEBHOOK_SECRET_PATH", path),
            ])
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "WEBHOOK_SECRET_PATH", .. }),
                "accepted {path}"
            );
        }
    }

    #[test]
    fn test_nested_webhook_path_is_kept() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_ADMIN_ID", "1"),
            ("WEBHOOK_SECRET_PATH", "/nested/hook-secret/"),
        ])
        .unwrap();
        assert_eq!(config.webhook_path, "nested/hook-secret");
    }
}
