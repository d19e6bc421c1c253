//! Integration tests for the environment workflows.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use infrabox_iac::{
    CreateOptions, DestroyOptions, EnvironmentManager, IacError, InfraboxConfig, InitializeOptions,
    Prompter, ProviderLink, WorkflowOutcome,
};
use infrabox_runner::{Interrupts, MockResponse, MockRunner, ProcessRunner};
use tempfile::{tempdir, TempDir};

const SHARED_PROVIDER: &str = "provider \"azurerm\" {\n  features {}\n}\n";

fn setup_root() -> TempDir {
    let dir = tempdir().unwrap();
    let shared = dir.path().join("Shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(shared.join("provider.tf"), SHARED_PROVIDER).unwrap();
    dir
}

fn manager(root: &Path, mock: &MockRunner) -> EnvironmentManager {
    EnvironmentManager::new(InfraboxConfig::new(root), Arc::new(mock.clone()))
}

fn answers(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn existing_env(root: &Path, name: &str) -> PathBuf {
    let dir = root.join("environments").join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Every path under `root`, sorted, with file contents.
fn snapshot(root: &Path) -> Vec<(PathBuf, Option<String>)> {
    fn walk(dir: &Path, out: &mut Vec<(PathBuf, Option<String>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let meta = fs::symlink_metadata(&path).unwrap();
            if meta.is_dir() {
                out.push((path.clone(), None));
                walk(&path, out);
            } else {
                out.push((path.clone(), fs::read_to_string(&path).ok()));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}

#[tokio::test]
async fn test_invalid_environment_has_no_side_effects() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);
    let before = snapshot(root.path());

    for raw in ["prod", "../dev", "dev/../../etc", "", "dev;rm -rf /"] {
        let err = manager
            .initialize(raw, &InitializeOptions::default(), &mut answers(""))
            .await
            .unwrap_err();
        assert!(matches!(err, IacError::InvalidEnvironment { .. }), "{raw:?}: {err}");

        let err = manager
            .create(raw, &CreateOptions::default(), &mut answers("y\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, IacError::InvalidEnvironment { .. }));

        let err = manager
            .destroy(raw, &DestroyOptions::default(), &mut answers("y\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, IacError::InvalidEnvironment { .. }));
    }

    assert_eq!(mock.call_count(), 0);
    assert_eq!(snapshot(root.path()), before);
}

#[tokio::test]
async fn test_initialize_with_default_answers() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);

    let outcome = manager
        .initialize("dev", &InitializeOptions::default(), &mut answers("\n\n\n\n\n"))
        .await
        .unwrap();

    let env_dir = root.path().join("environments").join("dev");
    assert_eq!(
        outcome,
        WorkflowOutcome::Initialized {
            path: env_dir.clone(),
            provider: ProviderLink::Created,
        }
    );

    for file in ["variables.tf", "main.tf", "outputs.tf", "provider.tf"] {
        assert!(env_dir.join(file).exists(), "missing {file}");
    }

    let link = env_dir.join("provider.tf");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::canonicalize(&link).unwrap(),
        fs::canonicalize(root.path().join("Shared/provider.tf")).unwrap()
    );
    assert_eq!(fs::read_to_string(&link).unwrap(), SHARED_PROVIDER);

    let variables = fs::read_to_string(env_dir.join("variables.tf")).unwrap();
    assert!(variables.contains(r#"name_prefix = "Infrabox""#));
    assert!(variables.contains(r#"environment = "dev""#));
    assert!(variables.contains(r#"location = "westeurope""#));
    assert!(variables.contains(r#"dns_zone_name = "Infrabox-dev.com""#));
    assert!(variables.contains(r#"admin_username = "azureuser""#));
    assert!(variables.contains(r#"ssh_public_key_path = "~/.ssh/id_rsa_infrabox.pub""#));

    assert_eq!(
        mock.call_args(),
        vec![vec!["init", "-input=false"], vec!["validate"]]
    );
    assert!(mock.calls().iter().all(|c| c.cwd.as_deref() == Some(env_dir.as_path())));
}

#[tokio::test]
async fn test_initialize_sanitizes_answers() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);

    let input = "Acme \"Corp\"\nnorth europe\nacme-stage.io\nops$admin\n~/.ssh/acme key.pub\n";
    let mut prompter = answers(input);
    manager
        .initialize("STAGE", &InitializeOptions::default(), &mut prompter)
        .await
        .unwrap();

    let variables =
        fs::read_to_string(root.path().join("environments/stage/variables.tf")).unwrap();
    assert!(variables.contains(r#"name_prefix = "AcmeCorp""#));
    assert!(variables.contains(r#"environment = "stage""#));
    assert!(variables.contains(r#"location = "northeurope""#));
    assert!(variables.contains(r#"dns_zone_name = "acme-stage.io""#));
    assert!(variables.contains(r#"admin_username = "opsadmin""#));
    assert!(variables.contains(r#"ssh_public_key_path = "~/.ssh/acmekey.pub""#));

    let prompts = String::from_utf8(prompter.into_output()).unwrap();
    assert!(prompts.contains("Enter DNS zone name [default: Infrabox-stage.com]: "));
}

#[tokio::test]
async fn test_initialize_twice_does_not_touch_existing_files() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);
    let options = InitializeOptions {
        dry_run: false,
        use_defaults: true,
    };

    manager.initialize("dev", &options, &mut answers("")).await.unwrap();
    let before = snapshot(root.path());
    let calls_before = mock.call_count();

    let err = manager
        .initialize("dev", &options, &mut answers(""))
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::EnvironmentAlreadyExists { ref name, .. } if name == "dev"));
    assert_eq!(snapshot(root.path()), before);
    assert_eq!(mock.call_count(), calls_before);
}

#[tokio::test]
async fn test_initialize_requires_shared_provider() {
    let root = tempdir().unwrap();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);

    let err = manager
        .initialize("dev", &InitializeOptions::default(), &mut answers("\n\n\n\n\n"))
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::MissingSharedResource(_)));
    assert!(!root.path().join("environments").exists());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_initialize_dry_run_writes_nothing() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);
    let before = snapshot(root.path());

    let outcome = manager
        .initialize(
            "dev",
            &InitializeOptions {
                dry_run: true,
                use_defaults: false,
            },
            &mut answers("\n\n\n\n\n"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::DryRun);
    assert_eq!(snapshot(root.path()), before);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_create_and_destroy_require_existing_environment() {
    let root = setup_root();
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);

    let err = manager
        .create("dev", &CreateOptions::default(), &mut answers("y\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, IacError::EnvironmentNotFound { .. }));

    let err = manager
        .destroy("stage", &DestroyOptions::default(), &mut answers("y\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, IacError::EnvironmentNotFound { .. }));

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_create_applies_confirmed_changes() {
    let root = setup_root();
    let env_dir = existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::success("Terraform has been successfully initialized!"),
        MockResponse::success("Success! The configuration is valid."),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);

    let outcome = manager
        .create("dev", &CreateOptions::default(), &mut answers("yes\n"))
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Applied);
    assert_eq!(
        mock.call_args(),
        vec![
            vec!["init", "-input=false"],
            vec!["validate"],
            vec!["plan", "-detailed-exitcode"],
            vec!["apply", "-auto-approve"],
        ]
    );
    assert!(mock.calls().iter().all(|c| c.cwd.as_deref() == Some(env_dir.as_path())));
}

#[tokio::test]
async fn test_create_declined_by_default() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);

    let outcome = manager
        .create("dev", &CreateOptions::default(), &mut answers("\n"))
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Declined);
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn test_create_without_changes_skips_prompt() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);

    // No input available: reaching the prompt would fail with Interrupted
    let outcome = manager
        .create("dev", &CreateOptions::default(), &mut answers(""))
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::NoChanges);
    assert!(mock.was_called("plan"));
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn test_create_plan_error_never_applies() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::failure(1, "Error: Reference to undeclared module"),
    ]);
    let manager = manager(root.path(), &mock);

    let err = manager
        .create("dev", &CreateOptions::default(), &mut answers("y\n"))
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::ExternalCommandFailure { exit_code: 1, .. }));
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn test_create_validate_failure_stops_before_plan() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::failure(1, "Error: Missing required argument"),
    ]);
    let manager = manager(root.path(), &mock);

    let err = manager
        .create("dev", &CreateOptions::default(), &mut answers("y\n"))
        .await
        .unwrap_err();

    match err {
        IacError::ExternalCommandFailure { command, output, .. } => {
            assert_eq!(command, "terraform validate");
            assert!(output.contains("Missing required argument"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!mock.was_called("plan"));
}

#[tokio::test]
async fn test_create_with_module_targets() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);
    let options = CreateOptions {
        dry_run: false,
        with_vm: true,
        with_subnet: true,
    };

    manager.create("dev", &options, &mut answers("y\n")).await.unwrap();

    let args = mock.call_args();
    assert_eq!(
        args[2],
        vec![
            "plan",
            "-detailed-exitcode",
            "-target=module.virtual_machine",
            "-target=module.networking",
        ]
    );
    assert_eq!(
        args[3],
        vec![
            "apply",
            "-auto-approve",
            "-target=module.virtual_machine",
            "-target=module.networking",
        ]
    );
}

#[tokio::test]
async fn test_destroy_applies_destroy_plan() {
    let root = setup_root();
    existing_env(root.path(), "stage");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);

    let mut prompter = answers("Y\n");
    let outcome = manager
        .destroy("stage", &DestroyOptions::default(), &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Applied);
    assert_eq!(
        mock.call_args(),
        vec![
            vec!["init", "-input=false"],
            vec!["validate"],
            vec!["plan", "-detailed-exitcode", "-destroy"],
            vec!["apply", "-auto-approve", "-destroy"],
        ]
    );

    let prompts = String::from_utf8(prompter.into_output()).unwrap();
    assert!(prompts.contains("Confirm destruction of resources? [y/N]: "));
}

#[tokio::test]
async fn test_destroy_declined() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);

    let outcome = manager
        .destroy("dev", &DestroyOptions::default(), &mut answers("n\n"))
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Declined);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_create_and_destroy_dry_run_execute_nothing() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new();
    let manager = manager(root.path(), &mock);
    let before = snapshot(root.path());

    let outcome = manager
        .create(
            "dev",
            &CreateOptions {
                dry_run: true,
                with_vm: true,
                with_subnet: false,
            },
            &mut answers(""),
        )
        .await
        .unwrap();
    assert_eq!(outcome, WorkflowOutcome::DryRun);

    let outcome = manager
        .destroy("dev", &DestroyOptions { dry_run: true }, &mut answers(""))
        .await
        .unwrap();
    assert_eq!(outcome, WorkflowOutcome::DryRun);

    assert_eq!(mock.call_count(), 0);
    assert_eq!(snapshot(root.path()), before);
}

#[tokio::test]
async fn test_interrupted_confirmation() {
    let root = setup_root();
    existing_env(root.path(), "dev");
    let mock = MockRunner::new().with_responses(vec![
        MockResponse::exit(0),
        MockResponse::exit(0),
        MockResponse::exit(2),
    ]);
    let manager = manager(root.path(), &mock);

    let err = manager
        .create("dev", &CreateOptions::default(), &mut answers(""))
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Interrupted));
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn test_configured_allow_list_and_binary() {
    let root = setup_root();
    fs::write(
        root.path().join("infrabox.yaml"),
        "environments: [qa]\nterraform_binary: tofu\n",
    )
    .unwrap();
    let mock = MockRunner::new();
    let config = InfraboxConfig::load(root.path()).unwrap();
    let manager = EnvironmentManager::new(config, Arc::new(mock.clone()));

    let err = manager
        .initialize("dev", &InitializeOptions::default(), &mut answers(""))
        .await
        .unwrap_err();
    assert!(matches!(err, IacError::InvalidEnvironment { .. }));

    let options = InitializeOptions {
        dry_run: false,
        use_defaults: true,
    };
    manager.initialize("qa", &options, &mut answers("")).await.unwrap();

    assert!(root.path().join("environments/qa/main.tf").is_file());
    assert!(mock.calls().iter().all(|c| c.program == "tofu"));
}

#[tokio::test]
async fn test_interrupt_stops_before_next_terraform_command() {
    let root = setup_root();
    existing_env(root.path(), "dev");

    let interrupts = Interrupts::new();
    interrupts.signal();
    let runner = ProcessRunner::new().quiet().with_interrupts(interrupts);
    let config = InfraboxConfig::new(root.path()).with_terraform_binary("not-installed-terraform");
    let manager = EnvironmentManager::new(config, Arc::new(runner));

    let err = manager
        .create("dev", &CreateOptions::default(), &mut answers("y\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, IacError::Interrupted));
}
