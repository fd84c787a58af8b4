use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Minutes between poll ticks.
    pub check_interval_minutes: u64,
    /// Gmail search filter applied on every tick, e.g. "from:example.com".
    pub query: String,
    /// Result cap for the list query. Clamped to the API ceiling (500).
    pub max_results: u32,
    pub credentials_path: Option<String>,
    pub token_path: Option<String>,
    pub db_path: Option<String>,
    /// Log filter, same syntax as RUST_LOG (e.g. "debug", "mail_checker=debug").
    pub log_level: Option<String>,
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail_checker"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_credentials_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("credentials.json");
    Ok(p)
}

pub fn default_token_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("token.json");
    Ok(p)
}

pub fn default_db_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("mail.db");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            check_interval_minutes: 1,
            query: "from:example.com".to_string(),
            max_results: 10,
            credentials_path: None,
            token_path: None,
            db_path: None,
            log_level: Some("debug".to_string()),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {} — edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

pub fn resolve_credentials_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.credentials_path {
        Ok(PathBuf::from(p))
    } else {
        default_credentials_path()
    }
}

pub fn resolve_token_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.token_path {
        Ok(PathBuf::from(p))
    } else {
        default_token_path()
    }
}

pub fn resolve_db_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.db_path {
        Ok(PathBuf::from(p))
    } else {
        default_db_path()
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn parses_minimal_config() {
        let cfg: Config = toml::from_str(
            r#"
            check_interval_minutes = 5
            query = "from:billing@example.com"
            max_results = 25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.check_interval_minutes, 5);
        assert_eq!(cfg.query, "from:billing@example.com");
        assert_eq!(cfg.max_results, 25);
        assert!(cfg.token_path.is_none());
        assert!(cfg.log_level.is_none());
    }

    #[test]
    fn parses_full_config() {
        let cfg: Config = toml::from_str(
            r#"
            check_interval_minutes = 1
            query = "is:unread"
            max_results = 10
            credentials_path = "/tmp/creds.json"
            token_path = "/tmp/token.json"
            db_path = "/tmp/mail.db"
            log_level = "mail_checker=debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.credentials_path.as_deref(), Some("/tmp/creds.json"));
        assert_eq!(cfg.log_level.as_deref(), Some("mail_checker=debug"));
    }
}
