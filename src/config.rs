//! Backend connection configuration.
//!
//! Values come from command-line flags with environment fallbacks. Exactly one
//! backend is opened per process; `cli::run` is the only place that looks at
//! [`Backend`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::db::surreal::Credentials;

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Relational backend (SQLite file via sqlx)
    Sqlite,
    /// Document backend (SurrealDB)
    Surreal,
}

#[derive(Debug, Clone, Args)]
pub struct DbConfig {
    /// Storage backend to open
    #[arg(long, env = "TM_BACKEND", value_enum, default_value = "sqlite", global = true)]
    pub backend: Backend,

    /// Database location: a file path for sqlite, an endpoint such as
    /// `surrealkv://path`, `mem://` or `ws://host:port` for surreal
    /// (defaults to the XDG data directory)
    #[arg(long = "db", env = "TM_DB", global = true)]
    pub endpoint: Option<String>,

    /// SurrealDB namespace
    #[arg(long, env = "TM_NAMESPACE", default_value = "taskmarket", global = true)]
    pub namespace: String,

    /// SurrealDB database name
    #[arg(long, env = "TM_DATABASE", default_value = "taskmarket", global = true)]
    pub database: String,

    /// Root username for remote SurrealDB endpoints
    #[arg(long = "user", env = "TM_USER", global = true)]
    pub username: Option<String>,

    /// Root password for remote SurrealDB endpoints
    #[arg(long, env = "TM_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Per-operation timeout in seconds (0 disables it)
    #[arg(long = "timeout", env = "TM_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl DbConfig {
    /// Deadline applied to every repository operation.
    pub fn operation_timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Sign-in credentials, present only when both parts are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// The configured endpoint, or the backend's default location.
    pub fn resolved_endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        match self.backend {
            Backend::Sqlite => get_data_dir().join("taskmarket.db").display().to_string(),
            Backend::Surreal => format!(
                "surrealkv://{}",
                get_data_dir().join("taskmarket.kv").display()
            ),
        }
    }
}

/// XDG data directory for taskmarket: `$XDG_DATA_HOME/taskmarket`, falling
/// back to `~/.local/share/taskmarket`, or `./taskmarket` without a home.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(|_| PathBuf::from("."));

    data_home.join("taskmarket")
}
