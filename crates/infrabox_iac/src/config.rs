//! Infrabox configuration.
//!
//! Built once at startup and passed explicitly to every component. The only
//! inputs are the infrastructure root, an optional `infrabox.yaml` inside it,
//! and CLI overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IacError, IacResult};

/// Name of the optional configuration file in the infrastructure root.
pub const CONFIG_FILE_NAME: &str = "infrabox.yaml";

/// Environments accepted when no configuration file says otherwise.
pub const DEFAULT_ENVIRONMENTS: &[&str] = &["dev", "stage"];

/// Terraform executable used when nothing else is configured.
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Contents of `infrabox.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Allow-list of environment names
    #[serde(default)]
    pub environments: Option<Vec<String>>,
    /// Terraform executable
    #[serde(default)]
    pub terraform_binary: Option<String>,
}

impl ConfigFile {
    /// Parse a configuration file.
    pub fn from_path(path: &Path) -> IacResult<Self> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| IacError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Runtime configuration shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraboxConfig {
    /// Infrastructure root holding `environments/` and `Shared/`
    pub root: PathBuf,
    /// Allow-list of environment names (lower-case)
    pub allowed_environments: Vec<String>,
    /// Terraform executable
    pub terraform_binary: String,
}

impl InfraboxConfig {
    /// Configuration with built-in defaults rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allowed_environments: DEFAULT_ENVIRONMENTS.iter().map(|s| s.to_string()).collect(),
            terraform_binary: DEFAULT_TERRAFORM_BINARY.to_string(),
        }
    }

    /// Defaults, overlaid with `<root>/infrabox.yaml` when it exists.
    pub fn load(root: impl Into<PathBuf>) -> IacResult<Self> {
        let mut config = Self::new(root);
        let path = config.config_file();

        if path.is_file() {
            debug!("Loading configuration from {:?}", path);
            let file = ConfigFile::from_path(&path)?;
            config.apply_file(file, &path)?;
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile, path: &Path) -> IacResult<()> {
        if let Some(environments) = file.environments {
            if environments.is_empty() {
                return Err(IacError::Config {
                    path: path.to_path_buf(),
                    message: "environments must not be empty".to_string(),
                });
            }
            self.allowed_environments = environments
                .iter()
                .map(|e| e.trim().to_lowercase())
                .collect();
        }
        if let Some(binary) = file.terraform_binary {
            self.terraform_binary = binary;
        }
        Ok(())
    }

    pub fn with_terraform_binary(mut self, binary: impl Into<String>) -> Self {
        self.terraform_binary = binary.into();
        self
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Directory holding one subdirectory per environment.
    pub fn environments_dir(&self) -> PathBuf {
        self.root.join("environments")
    }

    /// Provider configuration every environment links to.
    pub fn shared_provider(&self) -> PathBuf {
        self.root.join("Shared").join("provider.tf")
    }
}
