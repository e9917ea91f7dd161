//! Runner configuration file parsing.

use crate::{ConfigError, ConfigResult};
use collrun_core::{DEFAULT_RUNNER, RunConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Default location of exported reports.
pub const DEFAULT_RESULTS_FOLDER: &str = "./results";

/// Contents of a runner configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Collections to run, in order.
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
    /// Environment used by collections without their own.
    pub environment: Option<String>,
    /// Run collections concurrently.
    #[serde(default)]
    pub parallel: bool,
    /// Concurrency cap for parallel runs. 0 means one slot per collection.
    #[serde(default, deserialize_with = "whole_number")]
    pub max_concurrency: usize,
    /// Comma-separated reporter names.
    pub reporters: Option<String>,
    /// Directory for exported reports.
    pub export_results_folder: Option<String>,
    /// Runner binary, `postman` by default.
    pub runner: Option<String>,
}

/// One element of the `collections` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionEntry {
    Path(String),
    Spec(CollectionSpec),
}

/// Object form of a collection entry.
///
/// Fields that are empty or not strings read as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSpec {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub collection: Option<String>,
    /// Alias of `collection`.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub environment: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub output: Option<String>,
}

fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    as_whole_number(&value)
        .ok_or_else(|| serde::de::Error::custom("expected a non-negative integer"))
}

/// Non-negative integers, including integral floats such as `2.0`.
fn as_whole_number(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64).then_some(f as usize)
}

impl RunnerConfig {
    /// Reporter names split from the comma-separated list, first occurrence wins.
    pub fn reporter_list(&self) -> Vec<String> {
        let mut reporters: Vec<String> = Vec::new();
        for name in self.reporters.as_deref().unwrap_or_default().split(',') {
            let name = name.trim();
            if !name.is_empty() && !reporters.iter().any(|r| r == name) {
                reporters.push(name.to_string());
            }
        }
        reporters
    }

    /// Results folder as configured, before resolution.
    pub fn results_folder(&self) -> &str {
        self.export_results_folder
            .as_deref()
            .unwrap_or(DEFAULT_RESULTS_FOLDER)
    }

    /// Settings for a run, with the results folder made absolute.
    pub fn run_config(&self) -> ConfigResult<RunConfig> {
        Ok(RunConfig {
            parallel: self.parallel,
            max_concurrency: self.max_concurrency,
            environment: self.environment.clone(),
            reporters: self.reporter_list(),
            results_dir: std::path::absolute(self.results_folder())?,
            runner: self
                .runner
                .clone()
                .unwrap_or_else(|| DEFAULT_RUNNER.to_string()),
        })
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<RunnerConfig> {
    let absolute = std::path::absolute(path.as_ref())?;
    if !absolute.exists() {
        return Err(ConfigError::NotFound(absolute));
    }

    debug!(path = %absolute.display(), "Loading configuration");
    let content = std::fs::read_to_string(&absolute)?;
    parse_config(&content, &absolute)
}

/// Parse and validate configuration text. `path` is only used in errors.
pub fn parse_config(content: &str, path: &Path) -> ConfigResult<RunnerConfig> {
    let parse_error = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let value: Value = serde_json::from_str(content).map_err(parse_error)?;
    let errors = validate(&value);
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    serde_json::from_value(value).map_err(parse_error)
}

/// Check field types, collecting every problem instead of stopping at the first.
fn validate(value: &Value) -> Vec<String> {
    let Some(cfg) = value.as_object() else {
        return vec!["Configuration must be a JSON object.".to_string()];
    };

    let mut errors = Vec::new();

    if let Some(collections) = cfg.get("collections") {
        match collections.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    validate_collection(idx, item, &mut errors);
                }
            }
            None => errors.push(r#""collections" must be an array."#.to_string()),
        }
    }

    check_string(cfg, "environment", r#""environment" must be a string."#, &mut errors);

    if cfg.get("parallel").is_some_and(|v| !v.is_boolean()) {
        errors.push(r#""parallel" must be a boolean."#.to_string());
    }

    if cfg.get("maxConcurrency").is_some_and(|v| as_whole_number(v).is_none()) {
        errors.push(r#""maxConcurrency" must be a non-negative integer."#.to_string());
    }

    check_string(
        cfg,
        "reporters",
        r#""reporters" must be a comma-separated string."#,
        &mut errors,
    );
    check_string(
        cfg,
        "exportResultsFolder",
        r#""exportResultsFolder" must be a string."#,
        &mut errors,
    );
    check_string(cfg, "runner", r#""runner" must be a string."#, &mut errors);

    errors
}

fn check_string(cfg: &Map<String, Value>, key: &str, message: &str, errors: &mut Vec<String>) {
    if cfg.get(key).is_some_and(|v| !v.is_string()) {
        errors.push(message.to_string());
    }
}

fn validate_collection(idx: usize, item: &Value, errors: &mut Vec<String>) {
    match item {
        Value::String(_) => {}
        Value::Object(job) => {
            let present = |key: &str| job.get(key).is_some_and(is_truthy);

            if !present("collection") && !present("path") {
                errors.push(format!(
                    r#"collections[{idx}] requires a "collection" field."#
                ));
            } else if present("collection") && !job["collection"].is_string() {
                errors.push(format!("collections[{idx}].collection must be a string."));
            } else if !present("collection") && !job["path"].is_string() {
                errors.push(format!("collections[{idx}].path must be a string."));
            }

            for key in ["environment", "output"] {
                if present(key) && !job[key].is_string() {
                    errors.push(format!("collections[{idx}].{key} must be a string."));
                }
            }
        }
        _ => errors.push(format!("collections[{idx}] must be a string or object.")),
    }
}

/// Whether a value counts as set. Empty strings, `false`, `0` and `null` do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> ConfigResult<RunnerConfig> {
        parse_config(json, Path::new("config.json"))
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "collections": [
                "users.postman_collection.json",
                { "collection": "orders.json", "environment": "staging.json", "output": "orders" }
            ],
            "environment": "dev.json",
            "parallel": true,
            "maxConcurrency": 3,
            "reporters": "cli,json",
            "exportResultsFolder": "./out"
        }"#;

        let config = parse(json).unwrap();
        assert_eq!(config.collections.len(), 2);
        assert!(config.parallel);
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.environment.as_deref(), Some("dev.json"));
        assert_eq!(config.results_folder(), "./out");
        assert_eq!(
            config.collections[1],
            CollectionEntry::Spec(CollectionSpec {
                collection: Some("orders.json".to_string()),
                path: None,
                environment: Some("staging.json".to_string()),
                output: Some("orders".to_string()),
            })
        );
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"{ "collections": ["a.json"] }"#).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.max_concurrency, 0);
        assert!(config.reporter_list().is_empty());
        assert_eq!(config.results_folder(), DEFAULT_RESULTS_FOLDER);

        let run = config.run_config().unwrap();
        assert_eq!(run.runner, DEFAULT_RUNNER);
        assert!(run.results_dir.is_absolute());
        assert!(run.results_dir.ends_with("results"));
    }

    #[test]
    fn test_reporter_list_trims_and_dedupes() {
        let config = RunnerConfig {
            reporters: Some(" cli, json,,html ,json ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.reporter_list(), vec!["cli", "json", "html"]);
    }

    #[test]
    fn test_collects_all_validation_errors() {
        let json = r#"{
            "collections": [42, {}, { "collection": 7 }, { "path": "p.json", "output": 1 }],
            "parallel": "yes",
            "maxConcurrency": -1,
            "reporters": ["3"],
            "exportResultsFolder": false
        }"#;

        let errors = match parse(json) {
            Err(ConfigError::Validation(errors)) => errors,
            other => panic!("Expected validation errors, got {:?}", other),
        };

        assert!(errors.contains(&"collections[0] must be a string or object.".to_string()));
        assert!(errors.contains(&r#"collections[1] requires a "collection" field."#.to_string()));
        assert!(errors.contains(&"collections[2].collection must be a string.".to_string()));
        assert!(errors.contains(&"collections[3].output must be a string.".to_string()));
        assert!(errors.contains(&r#""parallel" must be a boolean."#.to_string()));
        assert!(errors.contains(&r#""maxConcurrency" must be a non-negative integer."#.to_string()));
        assert!(errors.contains(&r#""reporters" must be a comma-separated string."#.to_string()));
        assert!(errors.contains(&r#""exportResultsFolder" must be a string."#.to_string()));
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn test_falsy_job_fields_read_as_unset() {
        let json = r#"{ "collections": [{ "path": "a.json", "environment": false, "output": "" }] }"#;
        let config = parse(json).unwrap();
        assert_eq!(
            config.collections[0],
            CollectionEntry::Spec(CollectionSpec {
                path: Some("a.json".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_zero_concurrency_is_valid() {
        let config = parse(r#"{ "collections": ["a.json"], "maxConcurrency": 0 }"#).unwrap();
        assert_eq!(config.max_concurrency, 0);
    }

    #[test]
    fn test_integral_float_concurrency() {
        let config = parse(r#"{ "collections": ["a.json"], "maxConcurrency": 2.0 }"#).unwrap();
        assert_eq!(config.max_concurrency, 2);

        for bad in ["2.5", "-2.0", "\"2\""] {
            let json = format!(r#"{{ "collections": ["a.json"], "maxConcurrency": {} }}"#, bad);
            match parse(&json) {
                Err(ConfigError::Validation(errors)) => assert_eq!(
                    errors,
                    vec![r#""maxConcurrency" must be a non-negative integer."#.to_string()]
                ),
                other => panic!("Expected validation error for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(parse("[1, 2]"), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse("{ not json"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "collections": ["a.json"], "runner": "newman" }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.runner.as_deref(), Some("newman"));
        assert_eq!(config.run_config().unwrap().runner, "newman");
    }
}
