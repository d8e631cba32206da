use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Catalog path is set
/// - Narrowing limits are positive and weights are sane
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_sessions == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_sessions cannot be 0".to_string(),
        ));
    }

    if config.server.session_idle_secs == 0 {
        return Err(ConfigError::ValidationError(
            "server.session_idle_secs cannot be 0".to_string(),
        ));
    }

    if config.catalog.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.path cannot be empty".to_string(),
        ));
    }

    let narrowing = &config.narrowing;
    let limits = [
        ("question_pool", narrowing.question_pool),
        ("questions_per_candidate", narrowing.questions_per_candidate),
        ("max_questions", narrowing.max_questions),
        ("image_gate_depth", narrowing.image_gate_depth),
        ("image_choice_limit", narrowing.image_choice_limit),
        ("manual_choice_limit", narrowing.manual_choice_limit),
        ("candidate_display_limit", narrowing.candidate_display_limit),
    ];
    for (name, value) in limits {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "narrowing.{} cannot be 0",
                name
            )));
        }
    }

    if !narrowing.positive_bonus.is_finite() || narrowing.positive_bonus <= 0.0 {
        return Err(ConfigError::ValidationError(
            "narrowing.positive_bonus must be greater than 0".to_string(),
        ));
    }

    if !narrowing.negative_penalty.is_finite() || narrowing.negative_penalty < 0.0 {
        return Err(ConfigError::ValidationError(
            "narrowing.negative_penalty must be a finite, non-negative number".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, NarrowingConfig, ServerConfig};
    use std::net::IpAddr;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
                max_sessions: 10,
                session_idle_secs: 60,
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_catalog_path_fails() {
        let config = Config {
            catalog: CatalogConfig {
                path: PathBuf::new(),
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_question_limit_fails() {
        let config = Config {
            narrowing: NarrowingConfig {
                max_questions: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_questions"));
    }

    #[test]
    fn test_validate_negative_penalty_fails() {
        let config = Config {
            narrowing: NarrowingConfig {
                negative_penalty: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_nan_weights_fail() {
        for (bonus, penalty) in [(f64::NAN, 0.5), (1.0, f64::NAN), (f64::INFINITY, 0.5)] {
            let config = Config {
                narrowing: NarrowingConfig {
                    positive_bonus: bonus,
                    negative_penalty: penalty,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(
                validate_config(&config).is_err(),
                "bonus {} / penalty {} should be rejected",
                bonus,
                penalty
            );
        }
    }

    #[test]
    fn test_validate_zero_idle_timeout_fails() {
        let mut config = Config::default();
        config.server.session_idle_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("session_idle_secs"));
    }
}
