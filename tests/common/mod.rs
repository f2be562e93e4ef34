// Shared test helpers for integration tests
#![allow(dead_code)]

use ci_matrix::config::HookSettings;
use ci_matrix::execution::RunSettings;
use ci_matrix::models::EnvironmentConfiguration;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

/// A hook that always succeeds / 总是成功的钩子
pub const OK: &str = "sh -c 'exit 0'";
/// A hook that always fails with exit code 1 / 总是以退出码 1 失败的钩子
pub const FAIL: &str = "sh -c 'exit 1'";

pub fn workspace() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Builds a configuration from key/value pairs.
pub fn config(index: usize, pairs: &[(&str, &str)]) -> EnvironmentConfiguration {
    let vars: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvironmentConfiguration::new(index, None, vars)
}

pub fn hooks(install: &str, test: &str, upload: &str) -> HookSettings {
    HookSettings {
        install: install.to_string(),
        test: test.to_string(),
        upload: upload.to_string(),
        upload_retries: 0,
        timeout_secs: None,
    }
}

pub fn settings(work_dir: &Path, hooks: HookSettings) -> Arc<RunSettings> {
    Arc::new(RunSettings::new(hooks, work_dir.to_path_buf()))
}

/// Writes a `sh` script into `dir` and returns the hook command running it.
pub fn script_hook(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    format!("sh {}", path.display())
}

/// A hook that appends `<tag> <runtimeVersion>` to `hooks.log` in the
/// working directory, then exits with `code`.
pub fn recording_hook(dir: &Path, tag: &str, code: i32) -> String {
    script_hook(
        dir,
        &format!("{tag}.sh"),
        &format!("echo \"{tag} $runtimeVersion\" >> hooks.log\nexit {code}"),
    )
}

/// Lines written by `recording_hook`, empty if no hook ran.
pub fn hook_log(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("hooks.log"))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn write_matrix(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write matrix file");
    path
}
