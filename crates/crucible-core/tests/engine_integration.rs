//! End-to-end engine tests backed by real shell launcher scripts.
//!
//! Each test writes a small executable script standing in for a per-language
//! launcher, points the command table at it and drives the engine through
//! the public port.

#![cfg(unix)]

use crucible_core::{
    CodeExecutionEngine, CodeExecutor, ExecutionOutcome, ExecutionRequest, ExecutorConfig,
    ExecutorError, Language,
};
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

fn engine_with(
    base: &TempDir,
    commands: HashMap<Language, String>,
    process_timeout: u64,
    grace_margin: u64,
) -> CodeExecutionEngine {
    let config = ExecutorConfig {
        base_working_directory: base.path().join("runs"),
        default_timeout: process_timeout,
        process_timeout,
        grace_margin,
        commands,
    };
    CodeExecutionEngine::from_config(config).unwrap()
}

#[tokio::test]
async fn a_completed_run_is_classified_as_finished() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "python.sh",
        "echo x\nprintf 'FINISHED\\n' > \"$RESULT_FILE_NAME\"",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Python, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new("print('x')", vec![], vec![], Some(5000), Language::Python);
    let result = engine.process(request).await.unwrap();

    assert_eq!(
        result.outcome(),
        &ExecutionOutcome::Finished {
            exit_code: 0,
            stdout: vec!["x".into()],
            stderr: vec![],
        }
    );
}

#[tokio::test]
async fn the_environment_contract_and_stdin_reach_the_child() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "probe.sh",
        concat!(
            "echo \"$CODE\"\n",
            "echo \"flags=$COMPILER_FLAGS\"\n",
            "echo \"timeout=$TIMEOUT\"\n",
            "echo \"main=$MAIN_FILE_NAME\"\n",
            "cat\n",
            "printf 'FINISHED\\n' > \"$RESULT_FILE_NAME\"",
        ),
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::C, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new(
        "int main() {}",
        vec![],
        vec!["first".into(), "second".into()],
        Some(5000),
        Language::C,
    )
    .with_compiler_flags("-O2")
    .with_main_file_name("main.c");
    let result = engine.process(request).await.unwrap();

    match result.outcome() {
        ExecutionOutcome::Finished { exit_code, stdout, stderr } => {
            assert_eq!(*exit_code, 0);
            assert_eq!(
                stdout,
                &vec![
                    "int main() {}".to_string(),
                    "flags=-O2".to_string(),
                    "timeout=5.0".to_string(),
                    "main=main.c".to_string(),
                    "first".to_string(),
                    "second".to_string(),
                ]
            );
            assert!(stderr.is_empty());
        }
        other => panic!("expected a finished outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn a_hung_launcher_times_out_without_waiting_for_it() {
    let base = TempDir::new().unwrap();
    let script = write_script(base.path(), "sleepy.sh", "sleep 10");
    // Tight bounds so the wait gives up after ~300 ms while the child
    // sleeps on.
    let engine = engine_with(&base, HashMap::from([(Language::Python, script)]), 100, 200);

    let request = ExecutionRequest::new("", vec![], vec![], Some(100), Language::Python);
    let started = Instant::now();
    let result = engine.process(request).await.unwrap();

    assert_eq!(result.outcome(), &ExecutionOutcome::TimedOut);
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "the engine waited for the full sleep"
    );
}

#[tokio::test]
async fn a_compile_error_sentinel_is_classified_for_a_compiled_language() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "cc.sh",
        "echo 'syntax error' >&2\nprintf 'COMPILE_ERROR\\n' > \"$RESULT_FILE_NAME\"\nexit 1",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::C, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new("int main(", vec![], vec![], Some(5000), Language::C);
    let result = engine.process(request).await.unwrap();

    assert_eq!(
        result.outcome(),
        &ExecutionOutcome::CompileError {
            exit_code: 1,
            stdout: vec![],
            stderr: vec!["syntax error".into()],
        }
    );
}

#[tokio::test]
async fn a_self_reported_timeout_wins_over_a_clean_exit() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "self-timeout.sh",
        "printf 'TIMEOUT\\n' > \"$RESULT_FILE_NAME\"",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Ruby, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new("loop {}", vec![], vec![], Some(5000), Language::Ruby);
    let result = engine.process(request).await.unwrap();
    assert_eq!(result.outcome(), &ExecutionOutcome::TimedOut);
}

#[tokio::test]
async fn a_missing_sentinel_on_a_completed_run_is_an_unknown_error() {
    let base = TempDir::new().unwrap();
    let script = write_script(base.path(), "silent.sh", "true");
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Python, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new("", vec![], vec![], Some(5000), Language::Python);
    let result = engine.process(request).await.unwrap();
    assert_eq!(result.outcome(), &ExecutionOutcome::UnknownError);
}

#[tokio::test]
async fn a_nonzero_exit_code_is_reported_on_finished_runs() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "exit3.sh",
        "printf 'FINISHED\\n' > \"$RESULT_FILE_NAME\"\nexit 3",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Python, script)]),
        60_000,
        10_000,
    );

    let request = ExecutionRequest::new("", vec![], vec![], Some(5000), Language::Python);
    let result = engine.process(request).await.unwrap();

    match result.outcome() {
        ExecutionOutcome::Finished { exit_code, .. } => assert_eq!(*exit_code, 3),
        other => panic!("expected a finished outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn an_unmapped_language_aborts_before_anything_runs() {
    let base = TempDir::new().unwrap();
    let engine = engine_with(&base, HashMap::new(), 60_000, 10_000);

    let request = ExecutionRequest::new("puts 'x'", vec![], vec![], Some(5000), Language::Ruby);
    let result = engine.process(request).await;
    assert!(matches!(result, Err(ExecutorError::Configuration(_))));
}

#[tokio::test]
async fn concurrent_requests_run_in_disjoint_working_directories() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "pwd.sh",
        "echo \"$CODE\"\npwd\nprintf 'FINISHED\\n' > \"$RESULT_FILE_NAME\"",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Python, script)]),
        60_000,
        10_000,
    );

    let first = ExecutionRequest::new("alpha", vec![], vec![], Some(5000), Language::Python);
    let second = ExecutionRequest::new("beta", vec![], vec![], Some(5000), Language::Python);
    let (first, second) = tokio::join!(engine.process(first), engine.process(second));
    let (first, second) = (first.unwrap(), second.unwrap());

    let lines = |result: &crucible_core::ExecutionResult| match result.outcome() {
        ExecutionOutcome::Finished { stdout, .. } => stdout.clone(),
        other => panic!("expected a finished outcome, got {:?}", other),
    };
    let (first_lines, second_lines) = (lines(&first), lines(&second));

    // Each child saw its own CODE and a working directory of its own.
    assert_eq!(first_lines[0], "alpha");
    assert_eq!(second_lines[0], "beta");
    assert_ne!(first_lines[1], second_lines[1]);
}

#[tokio::test]
async fn the_default_timeout_applies_when_the_request_carries_none() {
    let base = TempDir::new().unwrap();
    let script = write_script(
        base.path(),
        "timeout-echo.sh",
        "echo \"$TIMEOUT\"\nprintf 'FINISHED\\n' > \"$RESULT_FILE_NAME\"",
    );
    let engine = engine_with(
        &base,
        HashMap::from([(Language::Python, script)]),
        2000,
        10_000,
    );

    let result = engine
        .run_code("", vec![], None, Language::Python)
        .await
        .unwrap();
    match result.outcome() {
        ExecutionOutcome::Finished { stdout, .. } => assert_eq!(stdout, &vec!["2.0".to_string()]),
        other => panic!("expected a finished outcome, got {:?}", other),
    }
}
