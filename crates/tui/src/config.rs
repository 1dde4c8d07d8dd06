use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub evolution: EvolutionConfig,
    pub company: CompanyConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub base_url: String,
    pub api_key: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    /// Name given to the tenant created on first run.
    pub default_name: String,
    /// Overrides the companies file location.
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sidebar_open: bool,
    pub sidebar_width: u16,
    pub toast_seconds: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            poll_interval_secs: 3,
            request_timeout_secs: 20,
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            default_name: "My Barbershop".to_string(),
            data_file: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            sidebar_width: 24,
            toast_seconds: 5,
        }
    }
}

impl EvolutionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "zapdesk", "zapdesk")
}

pub fn config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Falling back to default config: {e:#}");
                }
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies `EVOLUTION_API_URL` / `EVOLUTION_API_KEY` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("EVOLUTION_API_URL").ok(),
            std::env::var("EVOLUTION_API_KEY").ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, api_key: Option<String>) {
        if let Some(url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.evolution.base_url = url.trim().to_string();
        }
        if let Some(key) = api_key.filter(|v| !v.trim().is_empty()) {
            self.evolution.api_key = key.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.evolution.base_url)
            .map_err(|e| anyhow!("evolution.base_url is not a valid URL: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "evolution.base_url must use http or https, got {}",
                url.scheme()
            ));
        }
        Ok(())
    }

    pub fn companies_file(&self) -> PathBuf {
        self.company
            .data_file
            .clone()
            .unwrap_or_else(|| data_dir().join("companies.json"))
    }
}
