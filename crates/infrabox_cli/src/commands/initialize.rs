//! Initialize command - scaffold a new environment directory.

use anyhow::Result;
use clap::Args;
use tracing::info;

use infrabox_iac::{EnvironmentManager, InitializeOptions, Prompter, ProviderLink, WorkflowOutcome};

#[derive(Args)]
pub struct InitializeArgs {
    /// Environment to create
    pub environment: String,

    /// Print the files and commands without writing or running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Accept the default for every prompt
    #[arg(long)]
    pub defaults: bool,
}

pub async fn execute(args: InitializeArgs, manager: &EnvironmentManager) -> Result<()> {
    let name = manager.layout().parse_name(&args.environment)?;
    info!("Initializing environment {}", name);

    let options = InitializeOptions {
        dry_run: args.dry_run,
        use_defaults: args.defaults,
    };

    let outcome = manager
        .initialize(name.as_str(), &options, &mut Prompter::stdio())
        .await?;

    match outcome {
        WorkflowOutcome::Initialized {
            provider: ProviderLink::AlreadyExists,
            ..
        } => {
            println!("INFRABOX: ⚠️ provider.tf was already present and has been kept.");
        }
        WorkflowOutcome::DryRun => println!("INFRABOX: 🛑 Dry-run: nothing was written."),
        _ => {}
    }

    println!();
    println!("Next steps:");
    println!("  infrabox create {} --dry-run", name);

    Ok(())
}
