//! # Matrix Initialization Module / 矩阵初始化模块
//!
//! This module writes a starter matrix file, either straight from a default
//! template or through an interactive command-line wizard.
//!
//! 此模块写入一个初始矩阵文件，可以直接使用默认模板，也可以通过交互式命令行向导生成。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: hooks, runtime versions, coverage and branch filter
//! - **Disabled Example Entry**: shows how to keep an entry around but inactive
//! - **Overwrite Protection**: confirmation prompt, or `--force`
//!
//! - **交互式向导**: 钩子、运行时版本、覆盖率和分支过滤器
//! - **禁用示例条目**: 展示如何保留条目但使其处于非活动状态
//! - **覆盖保护**: 确认提示，或使用 `--force`

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::Path;

use crate::core::config::{
    BranchFilter, COVERAGE_KEY, ENABLED_KEY, HookSettings, MatrixFile, NAME_KEY, RUNTIME_VERSION_KEY,
    RawEntry,
};
use crate::infra::{fs::write_creating_parents, t};

fn entry(pairs: &[(&str, toml::Value)]) -> RawEntry {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn string(s: &str) -> toml::Value {
    toml::Value::String(s.to_string())
}

/// The template written by `init --non-interactive`: two conda
/// configurations with coverage, and a disabled system-python one.
pub fn default_matrix() -> MatrixFile {
    MatrixFile {
        language: "en".to_string(),
        hooks: HookSettings {
            upload_retries: 2,
            timeout_secs: Some(1800),
            ..HookSettings::default()
        },
        filter: Some(BranchFilter {
            branches: vec!["master".to_string()],
        }),
        env: vec![
            entry(&[
                ("distribution", string("conda")),
                (RUNTIME_VERSION_KEY, string("2.7")),
                ("NUMPY_VERSION", string("1.8.2")),
                ("SCIPY_VERSION", string("0.14.0")),
                (COVERAGE_KEY, toml::Value::Boolean(true)),
            ]),
            entry(&[
                ("distribution", string("conda")),
                (RUNTIME_VERSION_KEY, string("3.5")),
                ("NUMPY_VERSION", string("1.10.4")),
                ("SCIPY_VERSION", string("0.17.0")),
                (COVERAGE_KEY, toml::Value::Boolean(true)),
            ]),
            entry(&[
                (NAME_KEY, string("ubuntu")),
                (ENABLED_KEY, toml::Value::Boolean(false)),
                ("distribution", string("ubuntu")),
                (RUNTIME_VERSION_KEY, string("2.7")),
                (COVERAGE_KEY, toml::Value::Boolean(false)),
            ]),
        ],
    }
}

/// Runs the wizard (or writes the default template) to create a matrix file.
///
/// 运行向导（或写入默认模板）以创建矩阵文件。
pub fn run_init_wizard(
    output: &Path,
    language: &str,
    non_interactive: bool,
    force: bool,
) -> Result<()> {
    let theme = ColorfulTheme::default();
    let path_str = output.display().to_string();

    if output.exists() && !force {
        if non_interactive {
            println!(
                "{}",
                t!("init_file_exists", locale = language, path = &path_str).red()
            );
            println!("{}", t!("init_use_force", locale = language).yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init_overwrite_prompt", locale = language, path = &path_str))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    if non_interactive {
        return write_config(output, &default_matrix(), language);
    }

    println!("\n{}", t!("init_wizard_welcome", locale = language).cyan().bold());
    println!("{}", t!("init_wizard_description", locale = language));

    let defaults = HookSettings::default();
    let install: String = Input::with_theme(&theme)
        .with_prompt(t!("init_install_hook_prompt", locale = language))
        .default(defaults.install)
        .interact_text()?;
    let test: String = Input::with_theme(&theme)
        .with_prompt(t!("init_test_hook_prompt", locale = language))
        .default(defaults.test)
        .interact_text()?;
    let upload: String = Input::with_theme(&theme)
        .with_prompt(t!("init_upload_hook_prompt", locale = language))
        .default(defaults.upload)
        .interact_text()?;
    let distribution: String = Input::with_theme(&theme)
        .with_prompt(t!("init_distribution_prompt", locale = language))
        .default("conda".to_string())
        .interact_text()?;
    let versions: String = Input::with_theme(&theme)
        .with_prompt(t!("init_versions_prompt", locale = language))
        .default("2.7, 3.5".to_string())
        .interact_text()?;
    let coverage = Confirm::with_theme(&theme)
        .with_prompt(t!("init_coverage_prompt", locale = language))
        .default(true)
        .interact()?;
    let branch: String = Input::with_theme(&theme)
        .with_prompt(t!("init_branch_prompt", locale = language))
        .allow_empty(true)
        .default("master".to_string())
        .interact_text()?;

    let env: Vec<RawEntry> = versions
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|version| {
            entry(&[
                ("distribution", string(&distribution)),
                (RUNTIME_VERSION_KEY, string(version)),
                (COVERAGE_KEY, toml::Value::Boolean(coverage)),
            ])
        })
        .collect();

    if env.is_empty() {
        println!("{}", t!("init_no_versions", locale = language).yellow());
    }

    let matrix = MatrixFile {
        language: language.to_string(),
        hooks: HookSettings {
            install,
            test,
            upload,
            ..default_matrix().hooks
        },
        filter: (!branch.trim().is_empty()).then(|| BranchFilter {
            branches: vec![branch.trim().to_string()],
        }),
        env,
    };

    write_config(output, &matrix, language)
}

fn write_config(path: &Path, matrix: &MatrixFile, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(matrix)
        .context(t!("init_serialize_failed", locale = language).to_string())?;

    write_creating_parents(path, toml_string)?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", locale = language, path = path.display()).bold()
    );
    println!(
        "{}",
        t!("init_usage_hint", locale = language, path = path.display())
    );

    Ok(())
}
