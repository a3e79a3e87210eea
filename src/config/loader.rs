//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PorterConfig;
use super::secret::secret_string;
use crate::domain::errors::PorterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PorterConfig
/// 4. Applies environment variable overrides (PORTER_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<PorterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PorterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PorterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PorterConfig = toml::from_str(&contents)
        .map_err(|e| PorterError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        PorterError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PorterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the PORTER_* prefix
///
/// Environment variables follow the pattern: PORTER_<SECTION>_<KEY>,
/// e.g. PORTER_KAFKA_BROKERS, PORTER_STORAGE_BACKEND. The bare
/// DATABASE_URL variable is honored as a fallback for the connection
/// string.
fn apply_env_overrides(config: &mut PorterConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("PORTER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Kafka overrides
    if let Ok(val) = std::env::var("PORTER_KAFKA_BROKERS") {
        config.kafka.brokers = val;
    }
    if let Ok(val) = std::env::var("PORTER_KAFKA_TOPIC") {
        config.kafka.topic = val;
    }
    if let Ok(val) = std::env::var("PORTER_KAFKA_GROUP_ID") {
        config.kafka.group_id = val;
    }
    if let Ok(val) = std::env::var("PORTER_KAFKA_MAX_POLL_INTERVAL_MS") {
        if let Ok(ms) = val.parse() {
            config.kafka.max_poll_interval_ms = ms;
        }
    }
    if let Ok(val) = std::env::var("PORTER_KAFKA_SESSION_TIMEOUT_MS") {
        if let Ok(ms) = val.parse() {
            config.kafka.session_timeout_ms = ms;
        }
    }
    if let Ok(val) = std::env::var("PORTER_KAFKA_COMMIT_FAILED_MESSAGES") {
        config.kafka.commit_failed_messages = val.parse().unwrap_or(true);
    }

    // Database overrides
    if let Ok(val) = std::env::var("PORTER_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = val;
    } else if let Ok(val) = std::env::var("DATABASE_URL") {
        config.database.connection_string = val;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("PORTER_STORAGE_BACKEND") {
        match val.to_lowercase().as_str() {
            "local" => config.storage.backend = super::schema::StorageBackend::Local,
            "s3" => config.storage.backend = super::schema::StorageBackend::S3,
            "gcs" => config.storage.backend = super::schema::StorageBackend::Gcs,
            _ => {}
        }
    }
    if let Ok(val) = std::env::var("PORTER_STORAGE_LINK_EXPIRY_HOURS") {
        if let Ok(hours) = val.parse() {
            config.storage.link_expiry_hours = hours;
        }
    }

    // S3 overrides (only if the section is configured)
    if let Some(ref mut s3) = config.storage.s3 {
        if let Ok(val) = std::env::var("PORTER_STORAGE_S3_BUCKET") {
            s3.bucket = val;
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_S3_HOST") {
            s3.host = val;
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_S3_ACCESS_KEY") {
            s3.access_key = secret_string(val);
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_S3_SECRET_KEY") {
            s3.secret_key = secret_string(val);
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_S3_SSL_ENABLED") {
            s3.ssl_enabled = val.parse().unwrap_or(true);
        }
    }

    // GCS overrides (only if the section is configured)
    if let Some(ref mut gcs) = config.storage.gcs {
        if let Ok(val) = std::env::var("PORTER_STORAGE_GCS_BUCKET") {
            gcs.bucket = val;
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_GCS_ENDPOINT") {
            gcs.endpoint = val;
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_GCS_ACCESS_KEY") {
            gcs.access_key = secret_string(val);
        }
        if let Ok(val) = std::env::var("PORTER_STORAGE_GCS_SECRET_KEY") {
            gcs.secret_key = secret_string(val);
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PORTER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PORTER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
