//! Configuration for the importer.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ADAPTABLE_HOME, ADAPTABLE_CACHE)
//! 2. Config file (.adaptable/config.yaml)
//! 3. Defaults (~/.adaptable)
//!
//! Config file discovery:
//! - Searches current directory and parents for .adaptable/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::uniprot::DEFAULT_BASE_URL;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub uniprot: Option<UniProtConfig>,
    #[serde(default)]
    pub import: Option<ImportConfig>,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to config file)
    pub home: Option<String>,
    /// Response cache directory (relative to config file)
    pub cache: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniProtConfig {
    pub base_url: Option<String>,
    pub search_timeout_seconds: Option<u64>,
    pub fetch_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub max_length: Option<usize>,
    pub reviewed: Option<bool>,
    pub max_errors: Option<usize>,
    pub basename: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    /// Database types to ignore on top of the built-in list
    #[serde(default)]
    pub ignored_databases: Vec<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// Response cache directory
    pub cache: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// UniProt client settings
    pub uniprot: UniProtSettings,
    /// Import defaults
    pub import: ImportSettings,
    /// Extra database types to ignore
    pub ignored_databases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UniProtSettings {
    pub base_url: String,
    pub search_timeout_seconds: u64,
    pub fetch_timeout_seconds: u64,
}

impl Default for UniProtSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_timeout_seconds: 60,
            fetch_timeout_seconds: 5,
        }
    }
}

impl UniProtSettings {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub max_length: usize,
    pub reviewed: bool,
    pub max_errors: usize,
    pub basename: String,
    pub log_file: PathBuf,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_length: 50,
            reviewed: true,
            max_errors: 10,
            basename: "DATABASE".to_string(),
            log_file: PathBuf::from("uniprot_importer.log"),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".adaptable").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Inputs gathered from the environment
struct Environment {
    default_home: PathBuf,
    home: Option<String>,
    cache: Option<String>,
}

/// Merge a config file (if any) with environment overrides and defaults
fn resolve(
    config_file: Option<(PathBuf, ConfigFile)>,
    env: Environment,
) -> ResolvedConfig {
    let Some((config_path, config)) = config_file else {
        let home = env.home.map(PathBuf::from).unwrap_or(env.default_home);
        let cache = env
            .cache
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("cache"));

        return ResolvedConfig {
            home,
            cache,
            config_file: None,
            uniprot: UniProtSettings::default(),
            import: ImportSettings::default(),
            ignored_databases: Vec::new(),
        };
    };

    // .adaptable/ directory and the project root above it
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let base_dir = config_dir.parent().unwrap_or(Path::new("."));

    let home = if let Some(env_home) = env.home {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = config.paths.home {
        resolve_path(config_dir, home_path)
    } else {
        env.default_home
    };

    let cache = if let Some(env_cache) = env.cache {
        PathBuf::from(env_cache)
    } else if let Some(ref cache_path) = config.paths.cache {
        resolve_path(base_dir, cache_path)
    } else {
        home.join("cache")
    };

    let uniprot_defaults = UniProtSettings::default();
    let uniprot = match config.uniprot {
        Some(u) => UniProtSettings {
            base_url: u.base_url.unwrap_or(uniprot_defaults.base_url),
            search_timeout_seconds: u
                .search_timeout_seconds
                .unwrap_or(uniprot_defaults.search_timeout_seconds),
            fetch_timeout_seconds: u
                .fetch_timeout_seconds
                .unwrap_or(uniprot_defaults.fetch_timeout_seconds),
        },
        None => uniprot_defaults,
    };

    let import_defaults = ImportSettings::default();
    let import = match config.import {
        Some(i) => ImportSettings {
            max_length: i.max_length.unwrap_or(import_defaults.max_length),
            reviewed: i.reviewed.unwrap_or(import_defaults.reviewed),
            max_errors: i.max_errors.unwrap_or(import_defaults.max_errors),
            basename: i.basename.unwrap_or(import_defaults.basename),
            log_file: i
                .log_file
                .map(|p| resolve_path(base_dir, &p))
                .unwrap_or(import_defaults.log_file),
        },
        None => import_defaults,
    };

    ResolvedConfig {
        home,
        cache,
        config_file: Some(config_path),
        uniprot,
        import,
        ignored_databases: config
            .classifier
            .map(|c| c.ignored_databases)
            .unwrap_or_default(),
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".adaptable");

    let config_file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve(
        config_file,
        Environment {
            default_home,
            home: std::env::var("ADAPTABLE_HOME").ok(),
            cache: std::env::var("ADAPTABLE_CACHE").ok(),
        },
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn env(home: Option<&str>, cache: Option<&str>) -> Environment {
        Environment {
            default_home: PathBuf::from("/home/user/.adaptable"),
            home: home.map(str::to_string),
            cache: cache.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, env(None, None));

        assert_eq!(config.home, PathBuf::from("/home/user/.adaptable"));
        assert_eq!(config.cache, PathBuf::from("/home/user/.adaptable/cache"));
        assert!(config.config_file.is_none());
        assert_eq!(config.import.max_length, 50);
        assert!(config.import.reviewed);
        assert_eq!(config.import.max_errors, 10);
        assert_eq!(config.uniprot.fetch_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = resolve(None, env(Some("/srv/adaptable"), Some("/tmp/cache")));

        assert_eq!(config.home, PathBuf::from("/srv/adaptable"));
        assert_eq!(config.cache, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".adaptable");
        std::fs::create_dir_all(&config_dir).unwrap();

        let config_path = config_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
  cache: ../cache
uniprot:
  fetch_timeout_seconds: 30
import:
  max_length: 100
  reviewed: false
classifier:
  ignored_databases:
    - FooBar
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.paths.cache, Some("../cache".to_string()));
        assert_eq!(config.import.as_ref().unwrap().max_length, Some(100));

        let resolved = resolve(Some((config_path, config)), env(None, None));
        assert_eq!(resolved.uniprot.fetch_timeout_seconds, 30);
        assert_eq!(resolved.uniprot.search_timeout_seconds, 60);
        assert_eq!(resolved.uniprot.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.import.max_length, 100);
        assert!(!resolved.import.reviewed);
        assert_eq!(resolved.import.max_errors, 10);
        assert_eq!(resolved.ignored_databases, ["FooBar"]);
        assert!(resolved.config_file.is_some());
    }

    #[test]
    fn test_env_beats_config_file() {
        let config: ConfigFile = serde_yaml::from_str(
            "version: \"1.0\"\npaths:\n  home: /from/file\n",
        )
        .unwrap();

        let resolved = resolve(
            Some((PathBuf::from("/project/.adaptable/config.yaml"), config)),
            env(Some("/from/env"), None),
        );

        assert_eq!(resolved.home, PathBuf::from("/from/env"));
        assert_eq!(resolved.cache, PathBuf::from("/from/env/cache"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "../sibling"),
            PathBuf::from("/home/user/project/../sibling")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
