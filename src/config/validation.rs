use crate::config::types::MirrorConfig;
use crate::ConfigError;

/// Upper bound on simultaneously in-flight fetches
const MAX_CONCURRENT_LIMIT: usize = 1024;

/// Upper bound on either timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &MirrorConfig) -> Result<(), ConfigError> {
    validate_concurrency(config.max_concurrent)?;
    validate_timeouts(config.request_timeout, config.connect_timeout)?;
    validate_output_dir(config)?;
    validate_filters("reject", &config.reject, |entry| {
        entry.trim().trim_start_matches('.')
    })?;
    validate_filters("exclude", &config.exclude, |entry| entry.trim().trim_matches('/'))?;

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the concurrency budget
fn validate_concurrency(max_concurrent: usize) -> Result<(), ConfigError> {
    if max_concurrent < 1 || max_concurrent > MAX_CONCURRENT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, max_concurrent
        )));
    }
    Ok(())
}

/// Validates the timeouts (0 disables either one)
///
/// A connect timeout longer than an enabled request timeout could never fire.
fn validate_timeouts(request: u64, connect: u64) -> Result<(), ConfigError> {
    for (name, secs) in [("request-timeout", request), ("connect-timeout", connect)] {
        if secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "{} must be at most {} seconds, got {}",
                name, MAX_TIMEOUT_SECS, secs
            )));
        }
    }

    if request > 0 && connect > request {
        return Err(ConfigError::Validation(format!(
            "connect-timeout ({}s) cannot exceed request-timeout ({}s)",
            connect, request
        )));
    }
    Ok(())
}

/// Validates the output directory setting
fn validate_output_dir(config: &MirrorConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a filter list
///
/// An entry that is empty once normalized would match every resource.
fn validate_filters(
    name: &str,
    entries: &[String],
    normalize: impl Fn(&str) -> &str,
) -> Result<(), ConfigError> {
    for entry in entries {
        if normalize(entry).is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} entries cannot be empty, got '{}'",
                name, entry
            )));
        }
    }
    Ok(())
}
