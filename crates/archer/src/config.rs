use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use archer_tool::ResolverOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcherConfig {
    /// Upper bound on a tool's version query.
    pub probe_timeout_ms: u64,
    /// Directories searched for tools before `PATH`.
    pub search_paths: Vec<PathBuf>,
    /// Binary names pinned to a fixed path, e.g. `tar = "/usr/local/bin/gtar"`.
    pub tools: BTreeMap<String, PathBuf>,
}

impl Default for ArcherConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2000,
            search_paths: Vec::new(),
            tools: BTreeMap::new(),
        }
    }
}

impl ArcherConfig {
    const ENV_PREFIX: &str = "ARCHER_";
    const KEYS: &[&str] = &["probe_timeout_ms", "search_paths", "tools"];

    /// `$XDG_CONFIG_HOME/archer/config.toml`, else `~/.config/archer/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let base = env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|home| home.join(".config")))?;
        Some(base.join("archer").join("config.toml"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Defaults, then the TOML file at `path` if it exists, then `ARCHER_*`
    /// environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(Self::ENV_PREFIX).only(Self::KEYS))
            .extract()
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        let options = ResolverOptions::default()
            .probe_timeout(Duration::from_millis(self.probe_timeout_ms))
            .search_paths(self.search_paths.iter().cloned());
        self.tools
            .iter()
            .fold(options, |options, (name, path)| options.pin(name, path))
    }
}
