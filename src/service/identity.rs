use crate::models::error::{DeployError, Result};
use std::env;

/// Environment variables consulted for the user name, in order
pub const IDENTITY_VARS: &[&str] = &["USERNAME", "USER", "LOGNAME"];

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Result<String>;
}

/// Resolves the user from the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn current_user(&self) -> Result<String> {
        IDENTITY_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                DeployError::IdentityResolution(format!(
                    "none of {} is set",
                    IDENTITY_VARS.join(", ")
                ))
            })
    }
}

/// A fixed user name, from `--user` or a test
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(DeployError::IdentityResolution(
                "an empty user name was given".to_string(),
            ));
        }
        Ok(self.0.clone())
    }
}
