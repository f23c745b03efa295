//! Engine configuration resolved from the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::infrastructure::narrative::{
    DEFAULT_NARRATIVE_SERVICE_URL, DEFAULT_NARRATIVE_TIMEOUT_SECS,
};
use crate::infrastructure::neo4j::Neo4jSettings;

pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_NEO4J_MAX_CONNECTIONS: usize = 16;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub neo4j: Neo4jSettings,
    pub narrative_url: String,
    pub narrative_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
    /// `*` or a comma-separated origin list; `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let neo4j = Neo4jSettings {
            uri: var("NEO4J_URI", DEFAULT_NEO4J_URI),
            user: var("NEO4J_USER", "neo4j"),
            password: var("NEO4J_PASSWORD", "password"),
            max_connections: parse_or(
                "NEO4J_MAX_CONNECTIONS",
                lookup("NEO4J_MAX_CONNECTIONS"),
                DEFAULT_NEO4J_MAX_CONNECTIONS,
            ),
        };

        let timeout_secs = parse_or(
            "NARRATIVE_TIMEOUT_SECS",
            lookup("NARRATIVE_TIMEOUT_SECS"),
            DEFAULT_NARRATIVE_TIMEOUT_SECS,
        );

        let server_port = parse_or(
            "SERVER_PORT",
            lookup("SERVER_PORT").or_else(|| lookup("PORT")),
            DEFAULT_SERVER_PORT,
        );

        Self {
            neo4j,
            narrative_url: var("NARRATIVE_SERVICE_URL", DEFAULT_NARRATIVE_SERVICE_URL),
            narrative_timeout: Duration::from_secs(timeout_secs),
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server_host, self.server_port).parse()
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, default = %default, "Invalid numeric setting, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = config(&[]);
        assert_eq!(cfg.neo4j.uri, DEFAULT_NEO4J_URI);
        assert_eq!(cfg.neo4j.max_connections, DEFAULT_NEO4J_MAX_CONNECTIONS);
        assert_eq!(cfg.narrative_url, DEFAULT_NARRATIVE_SERVICE_URL);
        assert_eq!(cfg.narrative_timeout, Duration::from_secs(120));
        assert_eq!(cfg.server_port, 3000);
        assert!(cfg.cors_allowed_origins.is_none());
        assert_eq!(cfg.listen_addr().unwrap().port(), 3000);
    }

    #[test]
    fn port_falls_back_to_generic_port_variable() {
        assert_eq!(config(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(
            config(&[("PORT", "8080"), ("SERVER_PORT", "9000")]).server_port,
            9000
        );
    }

    #[test]
    fn unparseable_numbers_use_defaults() {
        let cfg = config(&[
            ("SERVER_PORT", "not-a-port"),
            ("NEO4J_MAX_CONNECTIONS", "-3"),
            ("NARRATIVE_TIMEOUT_SECS", "30"),
        ]);
        assert_eq!(cfg.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(cfg.neo4j.max_connections, DEFAULT_NEO4J_MAX_CONNECTIONS);
        assert_eq!(cfg.narrative_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_cors_setting_disables_cors() {
        assert!(config(&[("CORS_ALLOWED_ORIGINS", "  ")])
            .cors_allowed_origins
            .is_none());
    }
}
