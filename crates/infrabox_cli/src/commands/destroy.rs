//! Destroy command - tear down an environment's resources.

use anyhow::Result;
use clap::Args;
use tracing::info;

use infrabox_iac::{DestroyOptions, EnvironmentManager, EnvironmentName, Prompter, WorkflowOutcome};

#[derive(Args)]
pub struct DestroyArgs {
    /// Target environment
    pub environment: String,

    /// Print the actions without running Terraform
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: DestroyArgs, manager: &EnvironmentManager) -> Result<()> {
    let name = manager.layout().parse_name(&args.environment)?;
    info!("Destroying environment {}", name);

    let options = DestroyOptions {
        dry_run: args.dry_run,
    };

    let outcome = manager
        .destroy(name.as_str(), &options, &mut Prompter::stdio())
        .await?;

    if let Some(message) = outcome_message(&name, &outcome) {
        println!("{}", message);
    }

    Ok(())
}

fn outcome_message(name: &EnvironmentName, outcome: &WorkflowOutcome) -> Option<String> {
    match outcome {
        WorkflowOutcome::Applied => {
            Some(format!("INFRABOX: ✅ Resources of '{}' destroyed.", name))
        }
        WorkflowOutcome::NoChanges => Some("INFRABOX: ✅ Nothing to destroy.".to_string()),
        WorkflowOutcome::DryRun => {
            Some("INFRABOX: 🛑 Dry-run: skipping terraform destroy".to_string())
        }
        WorkflowOutcome::Declined | WorkflowOutcome::Initialized { .. } => None,
    }
}
