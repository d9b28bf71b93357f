use crate::models::config::Config;
use crate::models::deployment_pair::DeploymentPair;
use crate::models::error::{DeployError, Result};
use crate::service::path_resolver::USER_PLACEHOLDER;
use log::{info, warn};

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_numeric_values(config)?;

    let pairs = config.deployment_pairs();
    if pairs.is_empty() {
        return Err(DeployError::InvalidConfig(
            "At least one deployment pair must be configured (config file or --pair)".to_string(),
        ));
    }

    for (idx, pair) in pairs.iter().enumerate() {
        validate_pair(idx, pair)?;
    }

    info!("Configuration validation passed");
    Ok(())
}

fn validate_numeric_values(config: &Config) -> Result<()> {
    if config.max_threads == 0 {
        return Err(DeployError::InvalidConfig(
            "max_threads must be greater than 0".to_string(),
        ));
    }

    let cpu_count = num_cpus::get_physical();
    if config.max_threads > cpu_count * 2 {
        warn!(
            "max_threads ({}) is more than 2x the number of physical CPUs ({}). This may not improve performance.",
            config.max_threads, cpu_count
        );
    }

    Ok(())
}

fn validate_pair(idx: usize, pair: &DeploymentPair) -> Result<()> {
    if pair.source.as_os_str().is_empty() {
        return Err(DeployError::InvalidConfig(format!(
            "Deployment pair #{} has an empty source",
            idx + 1
        )));
    }

    if pair.destination.trim().is_empty() {
        return Err(DeployError::InvalidConfig(format!(
            "Deployment pair #{} has an empty destination",
            idx + 1
        )));
    }

    // Braces are legal in file names, so an unknown token may be a real folder.
    if let Some(token) = unknown_placeholder(&pair.destination) {
        warn!(
            "Deployment pair #{} destination '{}' contains '{}', which is not a placeholder and is used literally. Only {} is substituted.",
            idx + 1,
            pair.destination,
            token,
            USER_PLACEHOLDER
        );
    }

    // Missing sources fail their own pair at deploy time; the rest still run.
    if !pair.source.is_file() {
        warn!(
            "Deployment pair #{} source does not exist or is not a file: {}",
            idx + 1,
            pair.source.display()
        );
    }

    Ok(())
}

/// Returns the first `{name}` token that looks like a placeholder but is not `{user}`.
///
/// Only identifier-shaped names count, so GUID folders such as
/// `{3F2504E0-4F89-11D3-9A0C-0305E82C3301}` are left alone.
fn unknown_placeholder(template: &str) -> Option<&str> {
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let candidate = &rest[start..];
        let end = candidate.find('}')?;
        let token = &candidate[..=end];
        if token != USER_PLACEHOLDER && is_identifier(&token[1..end]) {
            return Some(token);
        }
        rest = &candidate[1..];
    }
    None
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
