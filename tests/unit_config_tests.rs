//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Loading and validation of matrix files.
//!
//! 矩阵文件的加载与验证。

mod common;

use ci_matrix::config::{
    COVERAGE_KEY, HookSettings, MatrixFormat, RUNTIME_VERSION_KEY, load_matrix, parse_matrix,
};
use ci_matrix::core::ConfigError;
use std::path::Path;

const FULL_MATRIX: &str = r#"
language = "zh-CN"

[hooks]
install = "./ci/install.sh"
test = "./ci/test_script.sh"
upload = "coveralls --verbose"
upload_retries = 2
timeout_secs = 600

[filter]
branches = ["master"]

[[env]]
distribution = "conda"
runtimeVersion = "2.7"
NUMPY_VERSION = "1.8.2"
SCIPY_VERSION = "0.14.0"
coverageEnabled = true

[[env]]
name = "ubuntu"
enabled = false
distribution = "ubuntu"
runtimeVersion = "2.7"
"#;

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[test]
    fn test_full_matrix_is_loaded_in_order() {
        let matrix = parse_matrix(FULL_MATRIX, MatrixFormat::Toml).unwrap();

        assert_eq!(matrix.language, "zh-CN");
        assert_eq!(matrix.hooks.install, "./ci/install.sh");
        assert_eq!(matrix.hooks.upload, "coveralls --verbose");
        assert_eq!(matrix.hooks.upload_retries, 2);
        assert_eq!(matrix.hooks.timeout_secs, Some(600));
        assert_eq!(matrix.filter.as_ref().unwrap().branches, vec!["master"]);
        assert_eq!(matrix.entries.len(), 2);

        let first = &matrix.entries[0];
        assert!(first.enabled);
        assert_eq!(first.config.index, 0);
        assert_eq!(first.config.runtime_version(), "2.7");
        assert_eq!(first.config.get("NUMPY_VERSION"), Some("1.8.2"));
        assert!(first.config.coverage_enabled());

        let second = &matrix.entries[1];
        assert!(!second.enabled);
        assert_eq!(second.config.index, 1);
        assert_eq!(second.config.name, "ubuntu");
        assert!(!second.config.coverage_enabled());
        assert_eq!(matrix.disabled_count(), 1);
    }

    #[test]
    fn test_reserved_keys_are_not_exported() {
        let matrix = parse_matrix(FULL_MATRIX, MatrixFormat::Toml).unwrap();
        let vars = matrix.entries[1].config.vars();

        assert!(!vars.contains_key("name"));
        assert!(!vars.contains_key("enabled"));
        assert_eq!(vars.get("distribution").map(String::as_str), Some("ubuntu"));
    }

    #[test]
    fn test_hooks_default_when_omitted() {
        let matrix = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "3.5"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap();

        assert_eq!(matrix.language, "en");
        assert_eq!(matrix.hooks, HookSettings::default());
        assert_eq!(matrix.hooks.install, "./install.sh");
        assert_eq!(matrix.hooks.test, "./test_script.sh");
        assert_eq!(matrix.hooks.upload, "coveralls");
        assert!(matrix.filter.is_none());
    }

    #[test]
    fn test_empty_matrix_is_not_an_error() {
        let matrix = parse_matrix("language = \"en\"\n", MatrixFormat::Toml).unwrap();
        assert!(matrix.entries.is_empty());
    }

    #[test]
    fn test_name_is_derived_from_variables() {
        let matrix = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            NUMPY_VERSION = "1.8.2"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap();

        assert_eq!(
            matrix.entries[0].config.name,
            "NUMPY_VERSION=1.8.2 runtimeVersion=2.7"
        );
    }

    #[test]
    fn test_scalar_values_become_strings() {
        let matrix = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "3.5"
            WORKERS = 4
            FAST = false
            "#,
            MatrixFormat::Toml,
        )
        .unwrap();
        let config = &matrix.entries[0].config;

        assert_eq!(config.get("WORKERS"), Some("4"));
        assert_eq!(config.get("FAST"), Some("false"));
    }

    #[test]
    fn test_quoted_versions_keep_trailing_zeros() {
        let matrix = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "3.10"
            NUMPY_VERSION = "1.20"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap();
        let config = &matrix.entries[0].config;

        assert_eq!(config.runtime_version(), "3.10");
        assert_eq!(config.get("NUMPY_VERSION"), Some("1.20"));
    }

    #[test]
    fn test_coverage_flag_accepts_strings() {
        let matrix = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            coverageEnabled = "TRUE"

            [[env]]
            runtimeVersion = "3.5"
            coverageEnabled = "false"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap();

        assert!(matrix.entries[0].config.coverage_enabled());
        assert_eq!(matrix.entries[0].config.get(COVERAGE_KEY), Some("true"));
        assert!(!matrix.entries[1].config.coverage_enabled());
    }

    #[test]
    fn test_json_matrix() {
        let matrix = parse_matrix(
            r#"{
                "hooks": { "install": "make deps", "test": "make test" },
                "env": [
                    { "runtimeVersion": "2.7", "coverageEnabled": true, "SCIPY_VERSION": "0.14.0" },
                    { "runtimeVersion": "3.5" }
                ]
            }"#,
            MatrixFormat::Json,
        )
        .unwrap();

        assert_eq!(matrix.hooks.install, "make deps");
        assert_eq!(matrix.hooks.upload, "coveralls");
        assert_eq!(matrix.entries.len(), 2);
        assert!(matrix.entries[0].config.coverage_enabled());
        assert_eq!(matrix.entries[1].config.get(RUNTIME_VERSION_KEY), Some("3.5"));
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_missing_runtime_version_names_the_entry() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"

            [[env]]
            distribution = "conda"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingRuntimeVersion { entry: 2 }));
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_blank_runtime_version_is_rejected() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "  "
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingRuntimeVersion { entry: 1 }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_matrix("[[env]\nruntimeVersion = \"2.7\"", MatrixFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_matrix("{ \"env\": [", MatrixFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_invalid_coverage_flag() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            coverageEnabled = "sometimes"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        match err {
            ConfigError::InvalidValue { entry, key, .. } => {
                assert_eq!(entry, 1);
                assert_eq!(key, "coverageEnabled");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            PACKAGES = ["numpy", "scipy"]
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PACKAGES"));
    }

    #[test]
    fn test_unquoted_fractional_versions_are_rejected() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = 3.10
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        match err {
            ConfigError::InvalidValue { entry, key, reason } => {
                assert_eq!(entry, 1);
                assert_eq!(key, "runtimeVersion");
                assert!(reason.contains("must be quoted"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unquoted_fractional_versions_are_rejected_in_json() {
        let err = parse_matrix(
            r#"{ "env": [ { "runtimeVersion": "3.10", "NUMPY_VERSION": 1.20 } ] }"#,
            MatrixFormat::Json,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "NUMPY_VERSION"));
    }

    #[test]
    fn test_enabled_must_be_boolean() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            enabled = "no"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "enabled"));
    }

    #[test]
    fn test_key_with_equals_sign_is_rejected() {
        let err = parse_matrix(
            r#"
            [[env]]
            runtimeVersion = "2.7"
            "A=B" = "x"
            "#,
            MatrixFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

#[cfg(test)]
mod loading_tests {
    use super::*;
    use common::{workspace, write_matrix};

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(
            MatrixFormat::from_path(Path::new("Matrix.toml")).unwrap(),
            MatrixFormat::Toml
        );
        assert_eq!(
            MatrixFormat::from_path(Path::new("matrix.json")).unwrap(),
            MatrixFormat::Json
        );
        assert!(matches!(
            MatrixFormat::from_path(Path::new("matrix.yml")),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yml"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = workspace();
        let path = write_matrix(dir.path(), "Matrix.toml", FULL_MATRIX);

        let matrix = load_matrix(&path).unwrap();
        assert_eq!(matrix.entries.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = workspace();
        let err = load_matrix(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
