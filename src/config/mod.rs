mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::collections::HashMap;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            state_dir: default_state_dir(),
            report_dir: default_report_dir(),
            timeout_sec: default_timeout_sec(),
            retry: RetryConfig::default(),
            tools: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NoRetryAttempts);
        }

        for (name, tool) in &self.tools {
            if tool.command.as_os_str().is_empty() {
                return Err(ConfigError::EmptyCommand(name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_with_defaults() {
        let yaml = r#"
tools:
  create_case:
    command: ./bin/cases
    args: ["create"]
    timeout_sec: 30
  link_signal:
    command: curl
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.timeout_sec, 120);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.tools.len(), 2);
        assert_eq!(config.tools["create_case"].args, vec!["create"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let yaml = "tools:\n  broken:\n    command: \"\"\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyCommand(name)) if name == "broken"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NoRetryAttempts)));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Config::load(Path::new("/nonexistent/caseflow.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
        assert!(Config::load_or_default(Path::new("/nonexistent/caseflow.yaml")).is_ok());
    }
}
