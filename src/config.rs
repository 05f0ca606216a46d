use crate::auth::password::PasswordCost;
use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Where CRM data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Remote CRM REST service.
    Rest { base_url: String, token: Option<String> },
    /// Bundled SQLite store in the web tier's own database file.
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub schema_path: String,
    pub backend: Backend,
    pub max_workers: usize,
    /// Offset applied to stored UTC timestamps when bucketing report days.
    pub utc_offset_minutes: i32,
    /// First admin account for an empty SQLite store: (email, password).
    pub bootstrap_admin: Option<(String, String)>,
    /// Argon2id cost for passwords stored by the SQLite backend.
    pub password_cost: PasswordCost,
    /// Call-mode walks untouched for this many minutes are closed.
    pub walk_idle_minutes: i64,
}

impl Config {
    /// Bearer token shared with the CRM service, if one is configured.
    pub fn api_token(&self) -> Option<&str> {
        match &self.backend {
            Backend::Rest { token, .. } => token.as_deref(),
            Backend::Sqlite => None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("CRM_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .context("CRM_BIND_ADDR must be host:port")?;

        let backend = match lookup("CRM_API_URL").filter(|u| !u.trim().is_empty()) {
            Some(base_url) => Backend::Rest {
                base_url: base_url.trim_end_matches('/').to_string(),
                token: lookup("CRM_API_TOKEN").filter(|t| !t.is_empty()),
            },
            None => Backend::Sqlite,
        };

        let max_workers = number(&lookup, "CRM_MAX_WORKERS", 8)?;
        let utc_offset_minutes = number(&lookup, "CRM_UTC_OFFSET_MINUTES", 0)?;

        let defaults = PasswordCost::default();
        let password_cost = PasswordCost {
            memory_kib: number(&lookup, "CRM_ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            time_cost: number(&lookup, "CRM_ARGON2_TIME_COST", defaults.time_cost)?,
            parallelism: number(&lookup, "CRM_ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        argon2::Params::new(
            password_cost.memory_kib,
            password_cost.time_cost,
            password_cost.parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("invalid CRM_ARGON2_* cost: {e}"))?;

        let walk_idle_minutes = number(&lookup, "CRM_WALK_IDLE_MINUTES", 30)?;
        if walk_idle_minutes <= 0 {
            anyhow::bail!("CRM_WALK_IDLE_MINUTES must be positive");
        }

        let admin_email = lookup("CRM_ADMIN_EMAIL").filter(|e| !e.trim().is_empty());
        let bootstrap_admin = match (admin_email, lookup("CRM_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !password.is_empty() => Some((email, password)),
            (Some(_), _) => {
                anyhow::bail!("CRM_ADMIN_EMAIL is set but CRM_ADMIN_PASSWORD is missing or empty")
            }
            (None, _) => None,
        };

        Ok(Self {
            bind_addr,
            database_path: lookup("CRM_DATABASE_PATH").unwrap_or_else(|| "crm.sqlite3".into()),
            schema_path: lookup("CRM_SCHEMA_PATH").unwrap_or_else(|| "sql/schema.sql".into()),
            backend,
            max_workers,
            utc_offset_minutes,
            bootstrap_admin,
            password_cost,
            walk_idle_minutes,
        })
    }
}

fn number<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number")),
        None => Ok(default),
    }
}
