use std::path::PathBuf;

use serde::Deserialize;

use crate::db::validate_identifier;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Table holding the collected raw content records
    #[serde(default = "default_raw_content_table")]
    pub raw_content_table: String,

    /// Directory receiving one CSV file per gold view
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pool size; the pipeline is a single writer so one is enough
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://database/netflix_analysis.db".to_string()
}

fn default_raw_content_table() -> String {
    "netflix_content".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("reports/powerbi")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    1
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        validate_identifier(&self.raw_content_table)?;
        if self.max_connections == 0 {
            anyhow::bail!("MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    /// Socket address the HTTP surface binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>();
        envy::from_iter::<_, Config>(vars).unwrap()
    }

    #[test]
    fn test_defaults_apply_when_env_is_empty() {
        let config = from_pairs(&[]);
        assert_eq!(config.database_url, "sqlite://database/netflix_analysis.db");
        assert_eq!(config.raw_content_table, "netflix_content");
        assert_eq!(config.export_dir, PathBuf::from("reports/powerbi"));
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.max_connections, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = from_pairs(&[
            ("RAW_CONTENT_TABLE", "tmdb_content"),
            ("EXPORT_DIR", "/tmp/out"),
            ("PORT", "8080"),
        ]);
        assert_eq!(config.raw_content_table, "tmdb_content");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let config = from_pairs(&[("RAW_CONTENT_TABLE", "content; DROP TABLE x")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_connections() {
        let config = from_pairs(&[("MAX_CONNECTIONS", "0")]);
        assert!(config.validate().is_err());
    }
}
