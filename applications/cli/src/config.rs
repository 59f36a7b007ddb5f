/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_remote::RemoteConfig;
use tether_sync::{AgentOptions, OverflowPolicy, QueuePolicy};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "tether.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TetherConfig {
    #[serde(default = "default_remote")]
    pub remote: RemoteSettings,

    #[serde(default = "default_agent")]
    pub agent: AgentSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub app_name: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub max_pending: Option<usize>,

    #[serde(default)]
    pub overflow: OverflowPolicy,

    #[serde(default = "default_true")]
    pub persist_queue: bool,

    #[serde(default = "default_true")]
    pub push_local_on_miss: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl TetherConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `tether.toml` in the working
    /// directory is read if present. `TETHER_<SECTION>__<KEY>` variables
    /// override both, e.g. `TETHER_REMOTE__API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(env);

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.remote.url.is_empty() {
            return Err(CliError::Config(
                "Remote URL is required (set TETHER_REMOTE__URL)".to_string(),
            ));
        }

        if self.remote.api_key.is_empty() {
            return Err(CliError::Config(
                "API key is required (set TETHER_REMOTE__API_KEY)".to_string(),
            ));
        }

        if self.agent.app_name.is_empty() {
            return Err(CliError::Config(
                "Application name is required (set TETHER_AGENT__APP_NAME)".to_string(),
            ));
        }

        if self.agent.poll_interval_secs == 0 {
            return Err(CliError::Config(
                "Poll interval must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig::new(&self.remote.url, &self.remote.api_key)
            .with_table(&self.remote.table)
            .with_timeout_secs(self.remote.timeout_secs)
    }

    pub fn agent_options(&self) -> AgentOptions {
        AgentOptions {
            poll_interval: Duration::from_secs(self.agent.poll_interval_secs),
            queue: QueuePolicy {
                max_pending: self.agent.max_pending,
                overflow: self.agent.overflow,
                persist: self.agent.persist_queue,
            },
            push_local_on_miss: self.agent.push_local_on_miss,
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("TETHER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_remote() -> RemoteSettings {
    RemoteSettings {
        url: String::new(),
        api_key: String::new(),
        table: default_table(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_table() -> String {
    tether_remote::DEFAULT_TABLE.to_string()
}

fn default_timeout_secs() -> u64 {
    tether_remote::DEFAULT_TIMEOUT_SECS
}

fn default_agent() -> AgentSettings {
    AgentSettings {
        app_name: String::new(),
        poll_interval_secs: default_poll_interval_secs(),
        max_pending: None,
        overflow: OverflowPolicy::default(),
        persist_queue: true,
        push_local_on_miss: true,
    }
}

fn default_poll_interval_secs() -> u64 {
    tether_sync::DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_true() -> bool {
    true
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        path: default_cache_path(),
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./data/tether.redb")
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            agent: default_agent(),
            cache: default_cache(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> config::Environment {
        environment().source(Some(HashMap::new()))
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        environment().source(Some(map))
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = TetherConfig::default();
        assert_eq!(config.remote.table, "app_data");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.agent.poll_interval_secs, 30);
        assert!(config.agent.persist_queue);
        assert!(config.agent.max_pending.is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [remote]
            url = "https://project.example.co"
            api_key = "anon"

            [agent]
            app_name = "notes"
            max_pending = 50
            overflow = "reject_new"
            "#,
        );

        let config = TetherConfig::load_with_env(Some(file.path()), no_env()).unwrap();

        assert_eq!(config.remote.url, "https://project.example.co");
        assert_eq!(config.agent.app_name, "notes");
        assert_eq!(config.agent.max_pending, Some(50));
        assert_eq!(config.agent.overflow, OverflowPolicy::RejectNew);
        assert_eq!(config.remote.table, "app_data");
        config.validate().unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config(
            r#"
            [remote]
            url = "https://file.example.co"
            api_key = "from-file"
            "#,
        );

        let config = TetherConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("TETHER_REMOTE__API_KEY", "from-env"),
                ("TETHER_AGENT__APP_NAME", "park"),
                ("TETHER_AGENT__POLL_INTERVAL_SECS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.remote.url, "https://file.example.co");
        assert_eq!(config.remote.api_key, "from-env");
        assert_eq!(config.agent.app_name, "park");
        assert_eq!(config.agent.poll_interval_secs, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result =
            TetherConfig::load_with_env(Some(Path::new("/nonexistent/tether.toml")), no_env());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_agent_options_mapping() {
        let mut config = TetherConfig::default();
        config.agent.poll_interval_secs = 12;
        config.agent.max_pending = Some(3);
        config.agent.persist_queue = false;

        let options = config.agent_options();
        assert_eq!(options.poll_interval, Duration::from_secs(12));
        assert_eq!(options.queue.max_pending, Some(3));
        assert!(!options.queue.persist);
        assert!(options.push_local_on_miss);
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = TetherConfig::default();
        config.remote.url = "https://example.com".into();
        config.remote.api_key = "k".into();
        config.agent.app_name = "notes".into();
        config.agent.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
