use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("PETDIAG_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[catalog]
path = "data/diseases.json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.catalog.path.to_str(), Some("data/diseases.json"));
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.catalog.path.to_str(), Some("diseases.json"));
        assert_eq!(config.narrowing.max_questions, 5);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[server]
port = "eighty"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[narrowing]
image_gate_depth = 2
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.narrowing.image_gate_depth, 2);
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[server]
port = 3000

[narrowing]
max_questions = 5
"#,
            )?;
            jail.set_env("PETDIAG_NARROWING__MAX_QUESTIONS", "3");
            jail.set_env("PETDIAG_SERVER__SESSION_IDLE_SECS", "90");

            let config = load_config(Path::new("config.toml")).expect("config should load");
            assert_eq!(config.narrowing.max_questions, 3);
            assert_eq!(config.server.session_idle_secs, 90);
            assert_eq!(config.server.port, 3000);
            Ok(())
        });
    }
}
