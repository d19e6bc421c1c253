//! # infrabox_iac
//!
//! Terraform environment scaffolding and orchestration for Infrabox.
//!
//! This crate owns everything between the CLI and the Terraform binary:
//! environment name validation, the per-environment directory layout,
//! rendering of the generated `.tf` files, the Terraform command facade and
//! the initialize/create/destroy workflows.
//!
//! ## Features
//!
//! - Allow-listed, character-checked environment names
//! - Scaffolding of `variables.tf`, `main.tf`, `outputs.tf` plus a shared `provider.tf` link
//! - Terraform init, validate, plan (detailed exit codes), apply and destroy
//! - Interactive confirmation before anything is applied
//! - Dry-run mode throughout
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use infrabox_iac::{CreateOptions, EnvironmentManager, InfraboxConfig, Prompter};
//! use infrabox_runner::ProcessRunner;
//!
//! # async fn example() -> infrabox_iac::IacResult<()> {
//! let config = InfraboxConfig::load("/srv/infra")?;
//! let manager = EnvironmentManager::new(config, Arc::new(ProcessRunner::new()));
//!
//! let options = CreateOptions { dry_run: true, ..Default::default() };
//! manager.create("dev", &options, &mut Prompter::stdio()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod prompt;
pub mod sanitize;
pub mod scaffold;
pub mod templates;
pub mod terraform;
pub mod workflow;

pub use config::{ConfigFile, InfraboxConfig};
pub use environment::{EnvironmentLayout, EnvironmentName};
pub use error::{IacError, IacResult};
pub use prompt::Prompter;
pub use scaffold::{EnvironmentScaffold, ProviderLink};
pub use templates::{TemplateContext, TemplateRenderer};
pub use terraform::{PlanOptions, PlanStatus, Terraform, TerraformResult};
pub use workflow::{
    CreateOptions, DestroyOptions, EnvironmentManager, InitializeOptions, WorkflowOutcome,
};
