//! Env-driven configuration for the relay service.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. The provider key is optional at load time: the server still
//! starts without it and every enhance request then fails with a configuration
//! error.
use std::env;

/// Environment variables checked for the provider key, first non-empty wins.
pub const API_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "OPEN_AI_API_KEY"];

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub api_host: String,
    pub api_port: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup (the process env in
    /// `new`, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid MAX_BODY_BYTES '{}', falling back to {}", raw, DEFAULT_MAX_BODY_BYTES);
                DEFAULT_MAX_BODY_BYTES
            }),
            None => DEFAULT_MAX_BODY_BYTES,
        };
        Config {
            openai_api_key: resolve_api_key(&lookup),
            openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            api_host: lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            api_port: lookup("API_PORT").unwrap_or_else(|| "8080".to_string()),
            max_body_bytes,
        }
    }

    pub fn print_env_vars() {
        for name in API_KEY_VARS {
            let shown = match env::var(name) {
                Ok(v) if !v.is_empty() => "<set>",
                _ => "<unset>",
            };
            println!("{}: {}", name, shown);
        }
        println!("OPENAI_BASE_URL: {}", env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_HOST: {}", env::var("API_HOST").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_PORT: {}", env::var("API_PORT").unwrap_or_else(|_| "<unset>".to_string()));
        println!("MAX_BODY_BYTES: {}", env::var("MAX_BODY_BYTES").unwrap_or_else(|_| "<unset>".to_string()));
    }
}

fn resolve_api_key<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn primary_key_name_wins() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-primary"),
            ("OPEN_AI_API_KEY", "sk-secondary"),
        ]));
        assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-primary"));
    }

    #[test]
    fn falls_back_to_alternate_key_name() {
        let cfg = Config::from_lookup(lookup_from(&[("OPEN_AI_API_KEY", "sk-secondary")]));
        assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-secondary"));
    }

    #[test]
    fn empty_key_counts_as_absent() {
        let cfg = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "")]));
        assert!(cfg.openai_api_key.is_none());
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_lookup(lookup_from(&[]));
        assert!(cfg.openai_api_key.is_none());
        assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.api_host, "127.0.0.1");
        assert_eq!(cfg.api_port, "8080");
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn bad_body_limit_falls_back() {
        let cfg = Config::from_lookup(lookup_from(&[("MAX_BODY_BYTES", "lots")]));
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }
}
