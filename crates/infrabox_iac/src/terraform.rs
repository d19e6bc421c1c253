//! Terraform command facade.
//!
//! Each operation builds one fixed Terraform command line and hands it to a
//! [`CommandRunner`]. Short, quick commands have their output captured;
//! plan/apply/destroy stream straight to the terminal so progress is visible.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use infrabox_runner::{CommandRunner, CommandSpec, RunOutcome};

use crate::config::DEFAULT_TERRAFORM_BINARY;
use crate::error::{IacError, IacResult};

/// Result of a Terraform operation.
#[derive(Debug, Clone)]
pub struct TerraformResult {
    /// False when the command was skipped by dry-run
    pub executed: bool,
    pub success: bool,
    pub output: String,
    pub exit_code: Option<i32>,
}

impl From<RunOutcome> for TerraformResult {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            executed: outcome.was_executed(),
            success: outcome.success(),
            output: outcome.output(),
            exit_code: outcome.exit_code(),
        }
    }
}

/// Options shared by plan and apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Plan/apply the destruction of every managed resource
    pub destroy: bool,
    /// Resource addresses passed as `-target=`
    pub targets: Vec<String>,
}

impl PlanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroy() -> Self {
        Self {
            destroy: true,
            targets: Vec::new(),
        }
    }

    pub fn target(mut self, address: impl Into<String>) -> Self {
        self.targets.push(address.into());
        self
    }

    fn push_args(&self, args: &mut Vec<String>) {
        if self.destroy {
            args.push("-destroy".to_string());
        }
        for target in &self.targets {
            args.push(format!("-target={}", target));
        }
    }
}

/// Outcome of `terraform plan -detailed-exitcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Exit code 0
    NoChanges,
    /// Exit code 2
    ChangesPending,
    /// Any other exit code
    Failed(i32),
    /// Dry-run: plan was not executed
    Skipped,
}

impl PlanStatus {
    /// Map a detailed exit code onto a status.
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => Self::NoChanges,
            2 => Self::ChangesPending,
            other => Self::Failed(other),
        }
    }

    /// Only a successful plan with pending changes counts as "changes".
    pub fn has_changes(&self) -> bool {
        matches!(self, Self::ChangesPending)
    }
}

/// Terraform runner bound to one executable and one dry-run setting.
pub struct Terraform {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    dry_run: bool,
}

impl Terraform {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            binary: DEFAULT_TERRAFORM_BINARY.to_string(),
            dry_run: false,
        }
    }

    /// Use a different Terraform-compatible executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Run terraform init.
    pub async fn init(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform init in {:?}", working_dir);
        let spec = self.command(working_dir, ["init", "-input=false"], true);
        self.run_checked(&spec).await
    }

    /// Run terraform validate.
    pub async fn validate(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform validate in {:?}", working_dir);
        let spec = self.command(working_dir, ["validate"], true);
        self.run_checked(&spec).await
    }

    /// Run terraform plan with detailed exit codes.
    ///
    /// The exit code is returned as-is; use [`Terraform::has_changes`] to
    /// interpret it.
    pub async fn plan(
        &self,
        working_dir: &Path,
        options: &PlanOptions,
    ) -> IacResult<TerraformResult> {
        info!("Running terraform plan in {:?}", working_dir);
        let spec = self.plan_command(working_dir, options);
        Ok(self.runner.run(&spec).await?.into())
    }

    /// The command line [`Terraform::plan`] runs.
    pub fn plan_command(&self, working_dir: &Path, options: &PlanOptions) -> CommandSpec {
        let mut args = vec!["plan".to_string(), "-detailed-exitcode".to_string()];
        options.push_args(&mut args);
        self.command(working_dir, args, false)
    }

    /// Plan and report whether changes are pending.
    pub async fn has_changes(
        &self,
        working_dir: &Path,
        options: &PlanOptions,
    ) -> IacResult<PlanStatus> {
        let result = self.plan(working_dir, options).await?;

        let status = match result.exit_code {
            None => PlanStatus::Skipped,
            Some(code) => PlanStatus::from_exit_code(code),
        };

        match status {
            PlanStatus::Skipped => {
                println!("\nINFRABOX: 🔍 Dry-run mode: Terraform state changes not checked.")
            }
            PlanStatus::NoChanges => println!("INFRABOX: ✅ No changes detected."),
            PlanStatus::ChangesPending => println!("INFRABOX: ⚠️ Changes detected."),
            PlanStatus::Failed(code) => {
                error!("terraform plan exited with code {}", code);
                println!(
                    "INFRABOX: ❌ Error occurred while checking for changes (exit code {}).",
                    code
                );
            }
        }

        Ok(status)
    }

    /// Run terraform apply without an interactive approval step.
    pub async fn apply(
        &self,
        working_dir: &Path,
        options: &PlanOptions,
    ) -> IacResult<TerraformResult> {
        info!("Running terraform apply in {:?}", working_dir);
        let mut args = vec!["apply".to_string(), "-auto-approve".to_string()];
        options.push_args(&mut args);

        let spec = self.command(working_dir, args, false);
        self.run_checked(&spec).await
    }

    /// Run terraform destroy without an interactive approval step.
    pub async fn destroy(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform destroy in {:?}", working_dir);
        let spec = self.command(working_dir, ["destroy", "-auto-approve"], false);
        self.run_checked(&spec).await
    }

    fn command<I, S>(&self, working_dir: &Path, args: I, capture_output: bool) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.binary)
            .args(args)
            .cwd(working_dir)
            .dry_run(self.dry_run)
            .capture_output(capture_output)
    }

    async fn run_checked(&self, spec: &CommandSpec) -> IacResult<TerraformResult> {
        let result: TerraformResult = self.runner.run(spec).await?.into();

        if !result.success {
            return Err(IacError::ExternalCommandFailure {
                command: spec.display_command(),
                exit_code: result.exit_code.unwrap_or(-1),
                output: result.output,
            });
        }

        Ok(result)
    }
}
