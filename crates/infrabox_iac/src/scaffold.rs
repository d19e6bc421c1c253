//! Environment directory scaffolding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{IacError, IacResult};
use crate::templates::{TemplateContext, TemplateRenderer, TEMPLATE_FILES};

/// What happened to the `provider.tf` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderLink {
    Created,
    AlreadyExists,
    DryRun,
}

/// Writes an environment's files, or describes them in dry-run mode.
pub struct EnvironmentScaffold {
    renderer: TemplateRenderer,
    dry_run: bool,
}

impl EnvironmentScaffold {
    pub fn new(dry_run: bool) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            dry_run,
        }
    }

    /// Create the environment directory (and any missing parents).
    pub fn create_dir(&self, env_dir: &Path) -> IacResult<()> {
        if self.dry_run {
            println!(
                "INFRABOX: 🔍 Dry-run mode: would create environment directory at {}",
                env_dir.display()
            );
            return Ok(());
        }

        fs::create_dir_all(env_dir)?;
        info!("Created environment directory {:?}", env_dir);
        println!("INFRABOX: 📁 Created environment directory at {}", env_dir.display());
        Ok(())
    }

    /// Link `<env_dir>/provider.tf` to the shared provider configuration.
    ///
    /// The shared file must exist even in dry-run mode. An existing link is
    /// reported and left untouched.
    pub fn link_provider(&self, env_dir: &Path, shared_provider: &Path) -> IacResult<ProviderLink> {
        if !shared_provider.is_file() {
            return Err(IacError::MissingSharedResource(shared_provider.to_path_buf()));
        }

        let target = fs::canonicalize(shared_provider)?;
        let link = env_dir.join("provider.tf");

        if self.dry_run {
            println!(
                "INFRABOX: 🔍 Dry-run mode: would create symlink: {} → {}",
                link.display(),
                target.display()
            );
            return Ok(ProviderLink::DryRun);
        }

        match symlink_file(&target, &link) {
            Ok(()) => {
                println!(
                    "INFRABOX: 🔗 Created symlink: {} → {}",
                    link.display(),
                    target.display()
                );
                Ok(ProviderLink::Created)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                warn!("provider.tf already present in {:?}", env_dir);
                println!("INFRABOX: ⚠️ Symlink already exists: {}", link.display());
                Ok(ProviderLink::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Render every template into `env_dir`, overwriting existing files.
    ///
    /// Returns the paths written (or that would have been written).
    pub fn write_files(
        &self,
        env_dir: &Path,
        context: &TemplateContext,
    ) -> IacResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(TEMPLATE_FILES.len());

        for name in TEMPLATE_FILES {
            let content = self.renderer.render(name, context)?;
            let path = env_dir.join(name);

            if self.dry_run {
                println!(
                    "INFRABOX: 🔍 Dry-run mode: would write {}:\n{}",
                    path.display(),
                    content
                );
            } else {
                fs::write(&path, content)?;
                println!("INFRABOX: 📝 Wrote {}", path.display());
            }
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
