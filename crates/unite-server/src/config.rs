use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

/// Placeholder JWT secrets that should never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub demo_email: String,
    pub demo_password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("UNITE_JWT_SECRET").unwrap_or_else(|| DEFAULT_SECRET.into());
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("UNITE_JWT_SECRET is unset or a placeholder; tokens can be forged. Set it in .env");
        }

        let port: u16 = var("UNITE_PORT").unwrap_or_else(|| "3000".into()).parse()?;

        Ok(Self {
            host: var("UNITE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("UNITE_DB_PATH").unwrap_or_else(|| "unite.db".into()).into(),
            jwt_secret,
            demo_email: var("UNITE_DEMO_EMAIL").unwrap_or_else(|| unite_db::SEED_ADMIN_EMAIL.into()),
            demo_password: var("UNITE_DEMO_PASSWORD").unwrap_or_else(|| "12345".into()),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("unite.db"));
        assert_eq!(config.demo_email, "teste@teste.com.br");
        assert_eq!(config.demo_password, "12345");
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides_and_bad_port() {
        let config = Config::from_lookup(lookup(&[("UNITE_HOST", "127.0.0.1"), ("UNITE_PORT", "8080")])).unwrap();
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8080");

        assert!(Config::from_lookup(lookup(&[("UNITE_PORT", "http")])).is_err());
    }
}
