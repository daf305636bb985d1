//! Test command wrapper.
//!
//! Runs the configured test command with its report directory set to the
//! current run's directory. Test failures do not fail the wrapper, so the
//! report of a failing run still gets published.

use crate::config::Settings;
use crate::error::{PublishError, Result};
use crate::model::RunKey;
use crate::util::read_key;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Environment variable holding the run's output directory.
pub const OUTPUT_DIR_ENV: &str = "REPORT_OUTPUT_DIR";
/// Environment variable holding the run key.
pub const RUN_KEY_ENV: &str = "RUN_KEY";

/// Result of one test command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub key: RunKey,
    pub output_dir: PathBuf,
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub tests_passed: bool,
}

/// Run `command` (or the configured test command) for the persisted run key.
///
/// # Errors
///
/// Returns `TimestampMissing` if no key has been generated, and
/// `TestCommand` if the command is empty or cannot be spawned.
pub fn run_tests(settings: &Settings, command: &[String]) -> Result<RunOutcome> {
    let key = read_key(&settings.timestamp_file)?;
    let argv = if command.is_empty() {
        settings.test_command.as_slice()
    } else {
        command
    };
    let Some((program, args)) = argv.split_first() else {
        return Err(PublishError::TestCommand {
            command: String::new(),
            reason: "no test command configured".to_string(),
        });
    };

    let output_dir = settings.artifacts_dir.join(key.dir_name(&settings.run_prefix));
    fs::create_dir_all(&output_dir)?;
    tracing::info!(dir = %output_dir.display(), command = %argv.join(" "), "Running tests");

    let status = Command::new(program)
        .args(args)
        .current_dir(&settings.root)
        .env(OUTPUT_DIR_ENV, &output_dir)
        .env(RUN_KEY_ENV, key.as_str())
        .status()
        .map_err(|e| PublishError::TestCommand {
            command: argv.join(" "),
            reason: e.to_string(),
        })?;

    let tests_passed = status.success();
    if tests_passed {
        tracing::info!("Tests completed successfully");
    } else {
        tracing::warn!(
            exit_code = ?status.code(),
            "Tests failed; continuing so the report is still published"
        );
    }

    Ok(RunOutcome {
        key,
        output_dir,
        exit_code: status.code(),
        tests_passed,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::util::write_key;
    use tempfile::TempDir;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn settings_with_key(temp: &TempDir) -> Settings {
        let settings = Settings::defaults(temp.path()).unwrap();
        write_key(
            &settings.timestamp_file,
            &RunKey::new("2025-01-15_10-05").unwrap(),
        )
        .unwrap();
        settings
    }

    #[test]
    fn command_writes_into_run_directory() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_key(&temp);

        let outcome = run_tests(
            &settings,
            &sh(r#"echo "$RUN_KEY" > "$REPORT_OUTPUT_DIR/key.txt""#),
        )
        .unwrap();

        assert!(outcome.tests_passed);
        assert_eq!(
            outcome.output_dir,
            temp.path().join("playwright-report").join("report-2025-01-15_10-05")
        );
        assert_eq!(
            fs::read_to_string(outcome.output_dir.join("key.txt")).unwrap(),
            "2025-01-15_10-05\n"
        );
    }

    #[test]
    fn failing_tests_are_not_fatal() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_key(&temp);
        let outcome = run_tests(&settings, &sh("exit 3")).unwrap();
        assert!(!outcome.tests_passed);
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[test]
    fn missing_program_is_fatal() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_key(&temp);
        let err = run_tests(&settings, &["rpub-no-such-binary".to_string()]).unwrap_err();
        assert!(matches!(err, PublishError::TestCommand { .. }));
    }

    #[test]
    fn missing_key_is_fatal() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::defaults(temp.path()).unwrap();
        let err = run_tests(&settings, &sh("true")).unwrap_err();
        assert!(matches!(err, PublishError::TimestampMissing { .. }));
    }
}
