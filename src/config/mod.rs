use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Which persistence backend the server talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Supabase,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Supabase => "supabase",
        }
    }

    fn from_env_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Some(Backend::Sqlite),
            "supabase" => Some(Backend::Supabase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_key: Option<String>,
    /// Pre-built front end to serve next to the API.
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Identity created on first boot when no credentials are stored.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Never written back to disk.
    #[serde(default = "default_admin_password", skip_serializing)]
    pub admin_password: String,
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
    #[serde(default = "default_activity_log_limit")]
    pub activity_log_limit: i64,
}

fn default_backend() -> Backend {
    Backend::Sqlite
}
fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3001
}
fn default_admin_username() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "admin123".to_string()
}
fn default_hash_memory_kib() -> u32 {
    19_456
}
fn default_hash_iterations() -> u32 {
    2
}
fn default_hash_parallelism() -> u32 {
    1
}
fn default_activity_log_limit() -> i64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database: default_database(),
            host: default_host(),
            port: default_port(),
            supabase_url: None,
            supabase_key: None,
            static_dir: None,
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
            activity_log_limit: default_activity_log_limit(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.pointstracker`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pointstracker")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("pointstracker.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("pointstracker.sqlite")
    }

    /// Load configuration from `path` (or the standard location), falling
    /// back to defaults when the file does not exist, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_file);

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::from_yaml(&content)?
        } else {
            Config::default()
        };

        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Environment variables win over the file, matching how hosted
    /// deployments inject secrets.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT").and_then(|p| p.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if let Some(backend) = var("POINTS_BACKEND").and_then(|b| Backend::from_env_str(&b)) {
            self.backend = backend;
        }
        if let Some(url) = var("SUPABASE_URL") {
            self.supabase_url = Some(url);
        }
        if let Some(key) = var("SUPABASE_ANON_KEY") {
            self.supabase_key = Some(key);
        }
        if let Some(user) = var("ADMIN_USERNAME") {
            self.admin_username = user;
        }
        if let Some(pass) = var("ADMIN_PASSWORD") {
            self.admin_password = pass;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.backend == Backend::Supabase {
            let missing_url = self.supabase_url.as_deref().is_none_or(str::is_empty);
            let missing_key = self.supabase_key.as_deref().is_none_or(str::is_empty);
            if missing_url || missing_key {
                return Err(AppError::Config(
                    "supabase backend requires supabase_url and supabase_key (SUPABASE_URL / SUPABASE_ANON_KEY)"
                        .into(),
                ));
            }
        }
        if self.hash_memory_kib == 0 || self.hash_iterations == 0 || self.hash_parallelism == 0 {
            return Err(AppError::Config("password hash costs must be non-zero".into()));
        }
        if self.activity_log_limit < 0 {
            return Err(AppError::Config("activity_log_limit must not be negative".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Relative `--db` names live in the config directory, absolute paths
    /// are used as given.
    pub fn resolve_db_path(name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Initialize the configuration directory and file.
    ///
    /// Writes `base` to the config file unless `is_test`, then returns it.
    pub fn init_all(base: &Config, is_test: bool) -> AppResult<Self> {
        fs::create_dir_all(Self::config_dir())?;

        let config = base.clone();
        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        Ok(config)
    }
}
