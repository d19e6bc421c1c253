//! Infrabox CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success (a declined confirmation is a success)
//! - 1: General error
//! - 2: Invalid arguments / unsupported command
//! - 3: Invalid environment name
//! - 4: Environment not initialized
//! - 5: Environment already exists
//! - 6: Shared provider.tf missing
//! - 7: Terraform command failed
//! - 130: Interrupted

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use infrabox_iac::IacError;
use infrabox_runner::{InterruptAction, Interrupts};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INVALID_ENVIRONMENT: u8 = 3;
    pub const ENVIRONMENT_NOT_FOUND: u8 = 4;
    pub const ENVIRONMENT_EXISTS: u8 = 5;
    pub const MISSING_SHARED_RESOURCE: u8 = 6;
    pub const TERRAFORM_FAILURE: u8 = 7;
    pub const INTERRUPTED: u8 = 130;
}

/// Why argument parsing did not produce a [`Cli`].
#[derive(Debug)]
enum ParseFailure {
    /// Already reported; exit with this code
    Exit(u8),
    /// --help, --version and usage errors, printed by clap itself
    Clap(clap::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args_os(), &mut io::stderr()) {
        Ok(cli) => cli,
        Err(ParseFailure::Exit(code)) => return ExitCode::from(code),
        Err(ParseFailure::Clap(e)) => e.exit(),
    };

    init_logging(cli.verbose);

    let interrupts = Interrupts::new();
    install_interrupt_handler(interrupts.clone());

    let result = run(cli, &interrupts).await;

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => ExitCode::from(report_error(&e)),
    }
}

fn parse_cli<I, T>(args: I, err: &mut impl Write) -> Result<Cli, ParseFailure>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            let _ = writeln!(err, "INFRABOX: ❌ Unsupported command.");
            let _ = write!(err, "{}", e.render());
            Err(ParseFailure::Exit(ExitCodes::INVALID_ARGS))
        }
        Err(e) => Err(ParseFailure::Clap(e)),
    }
}

fn install_interrupt_handler(interrupts: Interrupts) {
    let result = ctrlc::set_handler(move || {
        if let Some(code) = on_interrupt(&interrupts, &mut io::stderr()) {
            std::process::exit(code.into());
        }
    });

    if let Err(e) = result {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }
}

/// React to Ctrl-C. Returns the exit code when the process should stop now.
fn on_interrupt(interrupts: &Interrupts, err: &mut impl Write) -> Option<u8> {
    match interrupts.signal() {
        InterruptAction::WaitForChild => {
            let _ = writeln!(
                err,
                "\nINFRABOX: ⚠️ Interrupt received, waiting for terraform to stop..."
            );
            None
        }
        InterruptAction::Abort => {
            let _ = writeln!(err, "\nINFRABOX: ❌ Aborted.");
            Some(ExitCodes::INTERRUPTED)
        }
    }
}

async fn run(cli: Cli, interrupts: &Interrupts) -> anyhow::Result<()> {
    let manager = cli.manager(interrupts)?;

    match cli.command {
        Commands::Create(args) => commands::create::execute(args, &manager).await,
        Commands::Destroy(args) => commands::destroy::execute(args, &manager).await,
        Commands::Initialize(args) => commands::initialize::execute(args, &manager).await,
    }
}

fn init_logging(verbose: bool) {
    // Crate targets are infrabox_cli, infrabox_iac and infrabox_runner
    let default_directives = if verbose {
        "infrabox=debug,warn"
    } else {
        "infrabox=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Print a user-facing message for `e` and pick the exit code.
fn report_error(e: &anyhow::Error) -> u8 {
    let Some(iac) = e.downcast_ref::<IacError>() else {
        eprintln!("INFRABOX: ❌ Error: {:#}", e);
        return ExitCodes::GENERAL_ERROR;
    };

    match iac {
        IacError::InvalidEnvironment { .. } => {
            eprintln!("INFRABOX: ❌ {}", iac);
            ExitCodes::INVALID_ENVIRONMENT
        }
        IacError::EnvironmentNotFound { name, .. } => {
            eprintln!("INFRABOX: ❌ Environment directory '{}' does not exist.", name);
            eprintln!(
                "INFRABOX: 💡 You may need to run: `infrabox initialize {}` first.",
                name
            );
            ExitCodes::ENVIRONMENT_NOT_FOUND
        }
        IacError::EnvironmentAlreadyExists { name, .. } => {
            eprintln!(
                "INFRABOX: ⚠️ Environment files for environment '{}' already exist. Aborting.",
                name
            );
            ExitCodes::ENVIRONMENT_EXISTS
        }
        IacError::MissingSharedResource(path) => {
            eprintln!("INFRABOX: ❌ Shared provider.tf not found at {}", path.display());
            ExitCodes::MISSING_SHARED_RESOURCE
        }
        IacError::ExternalCommandFailure { .. } => {
            eprintln!("INFRABOX: ❌ {}", iac);
            ExitCodes::TERRAFORM_FAILURE
        }
        IacError::Interrupted => {
            eprintln!("INFRABOX: ❌ Aborted.");
            ExitCodes::INTERRUPTED
        }
        _ => {
            eprintln!("INFRABOX: ❌ Error: {:#}", e);
            ExitCodes::GENERAL_ERROR
        }
    }
}
