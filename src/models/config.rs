use crate::models::config_validator::validate_config;
use crate::models::deployment_pair::DeploymentPair;
use crate::models::error::{DeployError, Result};
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base directory template that relative destinations are joined onto
    #[serde(default)]
    pub destination_root: Option<String>,
    #[serde(default = "default_source_directory")]
    pub source_directory: String,
    #[serde(default = "usize_one")]
    pub max_threads: usize,
    #[serde(default = "vec_default")]
    pub pairs: Vec<PairConfig>,
    /// Pairs given on the command line, used as-is
    #[serde(skip)]
    pub cli_pairs: Vec<DeploymentPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub source: String,
    pub destination: String,
}

/// Read from the working directory when neither `--config` nor `--pair` is given
pub const DEFAULT_CONFIG_FILE: &str = "deploy.json";

fn default_source_directory() -> String {
    String::from(".")
}
const fn vec_default() -> Vec<PairConfig> {
    Vec::new()
}
const fn usize_one() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            destination_root: None,
            source_directory: default_source_directory(),
            max_threads: usize_one(),
            pairs: vec_default(),
            cli_pairs: Vec::new(),
        }
    }
}

impl Config {
    /// Builds the ordered pair list, anchoring relative sources on `source_directory`
    /// and relative destination templates on `destination_root`. Command line pairs follow.
    pub fn deployment_pairs(&self) -> Vec<DeploymentPair> {
        self.pairs
            .iter()
            .map(|pair| {
                let source = Path::new(&self.source_directory).join(&pair.source);
                let destination = match &self.destination_root {
                    Some(root) if !Path::new(&pair.destination).is_absolute() => Path::new(root)
                        .join(&pair.destination)
                        .to_string_lossy()
                        .into_owned(),
                    _ => pair.destination.clone(),
                };
                DeploymentPair::new(source, destination)
            })
            .chain(self.cli_pairs.iter().cloned())
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len() + self.cli_pairs.len()
    }

    pub fn with_extra_pairs(mut self, extra: &[DeploymentPair]) -> Self {
        self.cli_pairs.extend_from_slice(extra);
        self
    }
}

pub fn setup_config(config_file: String) -> Result<Config> {
    let config_path = PathBuf::from(config_file);
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| {
        DeployError::ConfigRead {
            path: config_path.clone(),
            cause,
        }
    })?;

    let config: Config = serde_json::from_str(&config_str).map_err(|cause| {
        DeployError::ConfigParse {
            path: config_path,
            cause,
        }
    })?;

    Ok(config)
}

/// An explicit config file always wins; without one, `deploy.json` is only
/// implied when the command line brings no pairs of its own.
pub fn config_file_to_load(
    config_file: Option<String>,
    extra_pairs: &[DeploymentPair],
) -> Option<String> {
    match config_file {
        Some(file) => Some(file),
        None if extra_pairs.is_empty() => Some(DEFAULT_CONFIG_FILE.to_string()),
        None => None,
    }
}

/// Loads the config file, merges command line pairs and validates the result.
pub fn load_config(config_file: Option<String>, extra_pairs: &[DeploymentPair]) -> Result<Config> {
    let config = match config_file_to_load(config_file, extra_pairs) {
        Some(file) => setup_config(file)?,
        None => Config::default(),
    };
    let config = config.with_extra_pairs(extra_pairs);

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_valid_config_with_all_fields() {
        let temp_file = write_config(
            r#"{
            "destination_root": "/home/{user}/.config/SomeApp",
            "source_directory": "payload",
            "max_threads": 2,
            "pairs": [
                { "source": "A.new", "destination": "A" },
                { "source": "B.new", "destination": "/etc/someapp/B" }
            ]
        }"#,
        );

        let config = setup_config(temp_file.path().to_str().unwrap().to_string()).unwrap();

        assert_eq!(
            config.destination_root.as_deref(),
            Some("/home/{user}/.config/SomeApp")
        );
        assert_eq!(config.source_directory, "payload");
        assert_eq!(config.max_threads, 2);
        assert_eq!(config.pairs.len(), 2);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_file = write_config(r#"{ "pairs": [ { "source": "A.new", "destination": "/cfg/A" } ] }"#);

        let config = setup_config(temp_file.path().to_str().unwrap().to_string()).unwrap();

        assert_eq!(config.destination_root, None);
        assert_eq!(config.source_directory, ".");
        assert_eq!(config.max_threads, 1);
    }

    #[test]
    fn test_deployment_pairs_are_anchored() {
        let config = Config {
            destination_root: Some("/home/{user}/app".to_string()),
            source_directory: "payload".to_string(),
            max_threads: 1,
            pairs: vec![
                PairConfig {
                    source: "A.new".to_string(),
                    destination: "conf/A".to_string(),
                },
                PairConfig {
                    source: "/abs/B.new".to_string(),
                    destination: "/cfg/B".to_string(),
                },
            ],
            cli_pairs: vec![],
        };

        let pairs = config.deployment_pairs();

        assert_eq!(pairs[0].source, PathBuf::from("payload/A.new"));
        assert_eq!(pairs[0].destination, "/home/{user}/app/conf/A");
        assert_eq!(pairs[1].source, PathBuf::from("/abs/B.new"));
        assert_eq!(pairs[1].destination, "/cfg/B");
    }

    #[test]
    fn test_extra_pairs_are_appended_in_order() {
        let config = Config {
            pairs: vec![PairConfig {
                source: "A.new".to_string(),
                destination: "/cfg/A".to_string(),
            }],
            ..Config::default()
        }
        .with_extra_pairs(&[DeploymentPair::new("B.new", "/cfg/B")]);

        let pairs = config.deployment_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].source, PathBuf::from("./A.new"));
        assert_eq!(pairs[1].source, PathBuf::from("B.new"));
        assert_eq!(pairs[1].destination, "/cfg/B");
    }

    #[test]
    fn test_load_config_without_file_uses_cli_pairs() {
        let config = load_config(None, &[DeploymentPair::new("A.new", "/cfg/A")]).unwrap();
        assert_eq!(config.pair_count(), 1);
        assert!(config.pairs.is_empty());
    }

    #[test]
    fn test_config_file_selection() {
        let cli_pair = [DeploymentPair::new("A.new", "/cfg/A")];
        assert_eq!(config_file_to_load(None, &[]).as_deref(), Some("deploy.json"));
        assert_eq!(config_file_to_load(None, &cli_pair), None);
        assert_eq!(
            config_file_to_load(Some("other.json".to_string()), &cli_pair).as_deref(),
            Some("other.json")
        );
    }

    struct CurrentDirGuard(PathBuf);

    impl CurrentDirGuard {
        fn enter(dir: &Path) -> Self {
            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            CurrentDirGuard(previous)
        }
    }

    impl Drop for CurrentDirGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    #[serial]
    fn test_default_config_file_is_loaded_from_working_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "pairs": [ { "source": "A.new", "destination": "/cfg/A" } ] }"#,
        )
        .unwrap();
        let _cwd = CurrentDirGuard::enter(temp.path());

        let config = load_config(None, &[]).unwrap();

        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.pairs[0].destination, "/cfg/A");
    }

    #[test]
    #[serial]
    fn test_missing_default_config_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let _cwd = CurrentDirGuard::enter(temp.path());

        match load_config(None, &[]) {
            Err(DeployError::ConfigRead { path, .. }) => {
                assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_FILE))
            }
            other => panic!("Expected ConfigRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_without_any_pairs_fails() {
        let temp_file = write_config("{}");
        let result = load_config(Some(temp_file.path().to_str().unwrap().to_string()), &[]);
        match result {
            Err(DeployError::InvalidConfig(msg)) => assert!(msg.contains("pair")),
            other => panic!("Expected InvalidConfig error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_on_missing_config_file() {
        let result = setup_config("/this/does/not/exist/deploy.json".to_string());

        match result {
            Err(DeployError::ConfigRead { .. }) => {}
            _ => panic!("Expected ConfigRead error"),
        }
    }

    #[test]
    fn test_error_on_invalid_json() {
        let temp_file = write_config(
            r#"{
            "pairs": [
                "source": "A.new"
            ]
        }"#,
        );

        let result = setup_config(temp_file.path().to_str().unwrap().to_string());

        match result {
            Err(DeployError::ConfigParse { .. }) => {}
            _ => panic!("Expected ConfigParse error"),
        }
    }

    #[test]
    fn test_error_on_pair_missing_destination() {
        let temp_file = write_config(r#"{ "pairs": [ { "source": "A.new" } ] }"#);

        let result = setup_config(temp_file.path().to_str().unwrap().to_string());

        match result {
            Err(DeployError::ConfigParse { .. }) => {}
            _ => panic!("Expected ConfigParse error for missing required field"),
        }
    }
}
