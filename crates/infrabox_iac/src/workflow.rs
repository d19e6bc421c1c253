//! Command workflows: initialize, create and destroy an environment.
//!
//! Each workflow is a short linear sequence. Validation of the environment
//! name and directory always happens before any filesystem write or
//! Terraform invocation.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use infrabox_runner::CommandRunner;

use crate::config::InfraboxConfig;
use crate::environment::{EnvironmentLayout, EnvironmentName};
use crate::error::{IacError, IacResult};
use crate::prompt::Prompter;
use crate::sanitize::{sanitize_dns_name, sanitize_input, sanitize_path};
use crate::scaffold::{EnvironmentScaffold, ProviderLink};
use crate::templates::TemplateContext;
use crate::terraform::{PlanOptions, PlanStatus, Terraform};

/// Terraform address of the virtual machine module.
pub const VM_MODULE: &str = "module.virtual_machine";

/// Terraform address of the networking module.
pub const NETWORKING_MODULE: &str = "module.networking";

/// How a workflow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Environment directory scaffolded and validated
    Initialized { path: PathBuf, provider: ProviderLink },
    /// Plan reported nothing to do
    NoChanges,
    /// Changes were applied
    Applied,
    /// Changes were pending but the user said no
    Declined,
    /// Dry-run: actions were printed, nothing was executed
    DryRun,
}

#[derive(Debug, Clone, Default)]
pub struct InitializeOptions {
    pub dry_run: bool,
    /// Accept every default instead of prompting
    pub use_defaults: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub dry_run: bool,
    pub with_vm: bool,
    pub with_subnet: bool,
}

impl CreateOptions {
    /// Plan options restricted to the requested modules.
    pub fn plan_options(&self) -> PlanOptions {
        let mut options = PlanOptions::new();
        if self.with_vm {
            options = options.target(VM_MODULE);
        }
        if self.with_subnet {
            options = options.target(NETWORKING_MODULE);
        }
        options
    }
}

#[derive(Debug, Clone, Default)]
pub struct DestroyOptions {
    pub dry_run: bool,
}

/// Runs the environment workflows against one infrastructure root.
pub struct EnvironmentManager {
    config: InfraboxConfig,
    layout: EnvironmentLayout,
    runner: Arc<dyn CommandRunner>,
}

impl EnvironmentManager {
    pub fn new(config: InfraboxConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let layout = EnvironmentLayout::new(&config);
        Self {
            config,
            layout,
            runner,
        }
    }

    pub fn config(&self) -> &InfraboxConfig {
        &self.config
    }

    pub fn layout(&self) -> &EnvironmentLayout {
        &self.layout
    }

    fn terraform(&self, dry_run: bool) -> Terraform {
        Terraform::new(self.runner.clone())
            .with_binary(&self.config.terraform_binary)
            .dry_run(dry_run)
    }

    /// Scaffold a new environment directory, then init and validate it.
    pub async fn initialize<R: BufRead, W: Write>(
        &self,
        environment: &str,
        options: &InitializeOptions,
        prompter: &mut Prompter<R, W>,
    ) -> IacResult<WorkflowOutcome> {
        let name = self.layout.parse_name(environment)?;
        let env_dir = self.layout.require_absent(&name)?;

        let shared_provider = self.layout.shared_provider();
        if !shared_provider.is_file() {
            return Err(IacError::MissingSharedResource(shared_provider.clone()));
        }

        info!("Initializing environment {} at {:?}", name, env_dir);

        let context = if options.use_defaults {
            TemplateContext::defaults_for(name.as_str())
        } else {
            prompt_context(&name, prompter)?
        }
        .sanitized();

        let scaffold = EnvironmentScaffold::new(options.dry_run);
        scaffold.create_dir(&env_dir)?;
        let provider = scaffold.link_provider(&env_dir, shared_provider)?;
        scaffold.write_files(&env_dir, &context)?;

        let terraform = self.terraform(options.dry_run);
        terraform.init(&env_dir).await?;
        terraform.validate(&env_dir).await?;

        if options.dry_run {
            return Ok(WorkflowOutcome::DryRun);
        }

        println!(
            "INFRABOX: ✅ Initialization and validation complete for environment: {}",
            name
        );
        println!(
            "INFRABOX: 📂 Environment files created at {}.",
            env_dir.display()
        );

        Ok(WorkflowOutcome::Initialized {
            path: env_dir,
            provider,
        })
    }

    /// Plan the environment and apply pending changes once confirmed.
    pub async fn create<R: BufRead, W: Write>(
        &self,
        environment: &str,
        options: &CreateOptions,
        prompter: &mut Prompter<R, W>,
    ) -> IacResult<WorkflowOutcome> {
        let name = self.layout.parse_name(environment)?;
        let env_dir = self.layout.require_existing(&name)?;

        println!("INFRABOX: 📁 Using environment: {}", name);

        self.converge(
            &env_dir,
            &options.plan_options(),
            options.dry_run,
            "INFRABOX: ⚠️ Apply changes?",
            prompter,
        )
        .await
    }

    /// Plan the destruction of the environment and apply it once confirmed.
    pub async fn destroy<R: BufRead, W: Write>(
        &self,
        environment: &str,
        options: &DestroyOptions,
        prompter: &mut Prompter<R, W>,
    ) -> IacResult<WorkflowOutcome> {
        let name = self.layout.parse_name(environment)?;
        let env_dir = self.layout.require_existing(&name)?;

        println!("INFRABOX: 🗑️ Destroying environment: {}", name);

        self.converge(
            &env_dir,
            &PlanOptions::destroy(),
            options.dry_run,
            "INFRABOX: ⚠️ Confirm destruction of resources?",
            prompter,
        )
        .await
    }

    /// init → validate → plan → (confirm) → apply.
    async fn converge<R: BufRead, W: Write>(
        &self,
        env_dir: &Path,
        plan_options: &PlanOptions,
        dry_run: bool,
        question: &str,
        prompter: &mut Prompter<R, W>,
    ) -> IacResult<WorkflowOutcome> {
        let terraform = self.terraform(dry_run);

        terraform.init(env_dir).await?;
        terraform.validate(env_dir).await?;

        match terraform.has_changes(env_dir, plan_options).await? {
            PlanStatus::Skipped => {
                // Show what would have been applied
                terraform.apply(env_dir, plan_options).await?;
                Ok(WorkflowOutcome::DryRun)
            }
            PlanStatus::NoChanges => Ok(WorkflowOutcome::NoChanges),
            PlanStatus::Failed(exit_code) => Err(IacError::ExternalCommandFailure {
                command: terraform.plan_command(env_dir, plan_options).display_command(),
                exit_code,
                output: "see the plan output above".to_string(),
            }),
            PlanStatus::ChangesPending => {
                if prompter.confirm(question, false)? {
                    terraform.apply(env_dir, plan_options).await?;
                    info!("Applied changes in {:?}", env_dir);
                    Ok(WorkflowOutcome::Applied)
                } else {
                    println!("INFRABOX: ✅ Apply skipped.");
                    Ok(WorkflowOutcome::Declined)
                }
            }
        }
    }
}

/// Ask for every template value that is not derived from the environment name.
fn prompt_context<R: BufRead, W: Write>(
    name: &EnvironmentName,
    prompter: &mut Prompter<R, W>,
) -> IacResult<TemplateContext> {
    let defaults = TemplateContext::defaults_for(name.as_str());

    Ok(TemplateContext {
        name_prefix: prompter.ask("Enter name prefix", &defaults.name_prefix, sanitize_input)?,
        environment: name.to_string(),
        location: prompter.ask("Enter Azure location", &defaults.location, sanitize_input)?,
        dns_zone_name: prompter.ask(
            "Enter DNS zone name",
            &defaults.dns_zone_name,
            sanitize_dns_name,
        )?,
        admin_username: prompter.ask(
            "Enter admin username",
            &defaults.admin_username,
            sanitize_input,
        )?,
        ssh_public_key_path: prompter.ask(
            "Enter path to SSH public key",
            &defaults.ssh_public_key_path,
            sanitize_path,
        )?,
    })
}
