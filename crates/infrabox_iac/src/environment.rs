//! Environment names and their directories.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::config::InfraboxConfig;
use crate::error::{IacError, IacResult};
use crate::sanitize::is_safe_name;

/// A validated environment name.
///
/// Only constructible through [`EnvironmentName::parse`], so holding one
/// means the name passed both the character-class and allow-list checks
/// and is safe to join onto a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    /// Validate a user-supplied environment name.
    pub fn parse(raw: &str, allowed: &[String]) -> IacResult<Self> {
        let trimmed = raw.trim();

        if !is_safe_name(trimmed) {
            return Err(IacError::invalid_environment(
                raw,
                "only letters, digits, '-' and '_' are allowed",
            ));
        }

        let name = trimmed.to_lowercase();
        if !allowed.iter().any(|a| *a == name) {
            return Err(IacError::invalid_environment(
                raw,
                format!("expected one of: {}", allowed.join(", ")),
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvironmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps environment names onto directories under the infrastructure root.
#[derive(Debug, Clone)]
pub struct EnvironmentLayout {
    environments_dir: PathBuf,
    shared_provider: PathBuf,
    allowed: Vec<String>,
}

impl EnvironmentLayout {
    pub fn new(config: &InfraboxConfig) -> Self {
        Self {
            environments_dir: config.environments_dir(),
            shared_provider: config.shared_provider(),
            allowed: config.allowed_environments.clone(),
        }
    }

    /// Validate `raw` against this layout's allow-list.
    pub fn parse_name(&self, raw: &str) -> IacResult<EnvironmentName> {
        EnvironmentName::parse(raw, &self.allowed)
    }

    /// Directory for `name`, whether or not it exists.
    pub fn env_dir(&self, name: &EnvironmentName) -> PathBuf {
        self.environments_dir.join(name.as_str())
    }

    pub fn shared_provider(&self) -> &PathBuf {
        &self.shared_provider
    }

    /// Path of an environment that consuming commands operate on.
    pub fn require_existing(&self, name: &EnvironmentName) -> IacResult<PathBuf> {
        let path = self.env_dir(name);
        if !path.is_dir() {
            return Err(IacError::EnvironmentNotFound {
                name: name.to_string(),
                path,
            });
        }
        debug!("Resolved environment {} to {:?}", name, path);
        Ok(path)
    }

    /// Path of an environment that is about to be created.
    pub fn require_absent(&self, name: &EnvironmentName) -> IacResult<PathBuf> {
        let path = self.env_dir(name);
        // symlink_metadata so that a dangling link still counts as existing
        if path.symlink_metadata().is_ok() {
            return Err(IacError::EnvironmentAlreadyExists {
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }
}
