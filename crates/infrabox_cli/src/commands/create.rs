//! Create command - plan an environment and apply pending changes.

use anyhow::Result;
use clap::Args;
use tracing::info;

use infrabox_iac::{CreateOptions, EnvironmentManager, EnvironmentName, Prompter, WorkflowOutcome};

#[derive(Args)]
pub struct CreateArgs {
    /// Target environment
    pub environment: String,

    /// Print the actions without running Terraform
    #[arg(long)]
    pub dry_run: bool,

    /// Limit plan and apply to the virtual machine module
    #[arg(long = "with-VM")]
    pub with_vm: bool,

    /// Limit plan and apply to the networking module
    #[arg(long = "with-Subnet")]
    pub with_subnet: bool,
}

pub async fn execute(args: CreateArgs, manager: &EnvironmentManager) -> Result<()> {
    let name = manager.layout().parse_name(&args.environment)?;
    info!("Creating environment {}", name);

    let options = CreateOptions {
        dry_run: args.dry_run,
        with_vm: args.with_vm,
        with_subnet: args.with_subnet,
    };

    let outcome = manager
        .create(name.as_str(), &options, &mut Prompter::stdio())
        .await?;

    if let Some(message) = outcome_message(&name, &outcome) {
        println!("{}", message);
    }

    Ok(())
}

fn outcome_message(name: &EnvironmentName, outcome: &WorkflowOutcome) -> Option<String> {
    match outcome {
        WorkflowOutcome::Applied => {
            Some(format!("INFRABOX: ✅ Environment '{}' is up to date.", name))
        }
        WorkflowOutcome::NoChanges => Some("INFRABOX: ✅ Nothing to apply.".to_string()),
        WorkflowOutcome::DryRun => {
            Some("INFRABOX: 🛑 Dry-run: skipping terraform apply".to_string())
        }
        WorkflowOutcome::Declined | WorkflowOutcome::Initialized { .. } => None,
    }
}
