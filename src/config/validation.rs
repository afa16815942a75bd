//! Configuration validation.

use crate::config::Config;

/// Validate the configuration.
///
/// Checks for:
/// - A known log level
/// - A metrics path that starts with `/` and does not shadow the health endpoints
/// - A service name without whitespace or colons
/// - A non-empty lookup prefix
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    let path = &config.server.path;
    if !path.starts_with('/') {
        errors.push(format!("metrics path '{}' must start with '/'", path));
    }
    if path == "/health" || path == "/healthz" {
        errors.push(format!(
            "metrics path '{}' collides with the health endpoint",
            path
        ));
    }

    // An empty service is allowed and disables access control.
    let service = &config.access.service;
    if service.chars().any(|c| c.is_whitespace() || c == ':') {
        errors.push(format!(
            "service name '{}' must not contain whitespace or ':'",
            service
        ));
    }

    if config.access.lookup_prefix.is_empty() {
        errors.push("lookup prefix cannot be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        let mut config = Config::default();
        config.access.service = "monitoring_prometheus".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&minimal_config()).is_ok());
    }

    #[test]
    fn test_empty_service_is_valid() {
        let mut config = minimal_config();
        config.access.service.clear();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = minimal_config();
        config.global.log_level = "loud".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("invalid log level"));
    }

    #[test]
    fn test_relative_path() {
        let mut config = minimal_config();
        config.server.path = "metrics".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("must start with '/'"));
    }

    #[test]
    fn test_path_collides_with_health() {
        let mut config = minimal_config();
        config.server.path = "/healthz".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("health endpoint"));
    }

    #[test]
    fn test_service_with_whitespace() {
        let mut config = minimal_config();
        config.access.service = "my service".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("service name"));
    }

    #[test]
    fn test_empty_lookup_prefix() {
        let mut config = minimal_config();
        config.access.lookup_prefix.clear();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("lookup prefix"));
    }

    #[test]
    fn test_errors_are_joined() {
        let mut config = minimal_config();
        config.global.log_level = "loud".to_string();
        config.access.lookup_prefix.clear();
        let message = validate_config(&config).unwrap_err();
        assert!(message.contains("; "));
    }
}
