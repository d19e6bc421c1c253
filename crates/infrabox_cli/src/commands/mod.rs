//! CLI command definitions.
//!
//! This module defines the command structure for the Infrabox CLI.
//! Each subcommand maps to one environment workflow.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use infrabox_iac::{EnvironmentManager, InfraboxConfig};
use infrabox_runner::{Interrupts, ProcessRunner};

pub mod create;
pub mod destroy;
pub mod initialize;

/// Infrabox - per-environment Terraform scaffolding and orchestration
#[derive(Parser)]
#[command(name = "infrabox")]
#[command(version, about = "Infrabox - per-environment Terraform scaffolding and orchestration")]
#[command(long_about = r#"
Infrabox scaffolds one Terraform configuration directory per environment and
drives terraform init/validate/plan/apply against it, asking for confirmation
before anything is changed.

WORKFLOWS:
  initialize  → Create environments/<env> with generated .tf files
  create      → Plan the environment and apply pending changes
  destroy     → Plan the destruction of the environment and apply it

LAYOUT:
  <root>/environments/<env>/   - one directory per environment
  <root>/Shared/provider.tf    - provider configuration linked into every environment
  <root>/infrabox.yaml         - optional: allowed environments, terraform binary

EXIT CODES:
  0   - Success (including a declined confirmation)
  1   - General error
  2   - Invalid arguments or unsupported command
  3   - Invalid environment name
  4   - Environment not initialized
  5   - Environment already exists
  6   - Shared provider.tf missing
  7   - Terraform command failed
  130 - Interrupted
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Infrastructure root containing environments/ and Shared/
    #[arg(long, global = true, env = "INFRABOX_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Terraform executable to run
    #[arg(long, global = true, env = "INFRABOX_TERRAFORM")]
    pub terraform: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan an environment and apply pending changes
    Create(create::CreateArgs),

    /// Plan the destruction of an environment and apply it
    Destroy(destroy::DestroyArgs),

    /// Scaffold a new environment directory
    Initialize(initialize::InitializeArgs),
}

impl Cli {
    /// Build the configuration and workflow manager for this invocation.
    ///
    /// Terraform processes share `interrupts` with the Ctrl-C handler.
    pub fn manager(&self, interrupts: &Interrupts) -> Result<EnvironmentManager> {
        let root = fs::canonicalize(&self.root)
            .with_context(|| format!("Infrastructure root {:?} not found", self.root))?;

        let mut config = InfraboxConfig::load(&root)
            .with_context(|| format!("Failed to load configuration from {:?}", root))?;
        if let Some(binary) = &self.terraform {
            config = config.with_terraform_binary(binary);
        }
        debug!("Using configuration {:?}", config);

        let runner = ProcessRunner::new().with_interrupts(interrupts.clone());
        Ok(EnvironmentManager::new(config, Arc::new(runner)))
    }
}
