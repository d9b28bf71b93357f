use crate::models::deployment_pair::DeploymentPair;
use crate::models::error::{DeployError, Result};
use crate::service::identity::IdentityProvider;
use log::debug;
use std::path::PathBuf;

/// Replaced by the current user's name in destination templates
pub const USER_PLACEHOLDER: &str = "{user}";

/// Expands destination templates into absolute paths.
///
/// The user identity is looked up once, and only when some template needs it.
#[derive(Debug, Clone)]
pub struct PathResolver {
    user: Option<String>,
}

impl PathResolver {
    pub fn for_pairs(identity: &dyn IdentityProvider, pairs: &[DeploymentPair]) -> Result<Self> {
        let user = if pairs.iter().any(DeploymentPair::needs_identity) {
            let user = identity.current_user()?;
            debug!("Resolved user identity: {}", user);
            Some(user)
        } else {
            None
        };
        Ok(PathResolver { user })
    }

    #[cfg(test)]
    pub fn with_user(user: impl Into<String>) -> Self {
        PathResolver {
            user: Some(user.into()),
        }
    }

    pub fn resolve(&self, template: &str) -> Result<PathBuf> {
        let expanded = if template.contains(USER_PLACEHOLDER) {
            let user = self.user.as_deref().ok_or_else(|| {
                DeployError::IdentityResolution(format!(
                    "'{}' needs the user name, which was not resolved",
                    template
                ))
            })?;
            template.replace(USER_PLACEHOLDER, user)
        } else {
            template.to_string()
        };

        let path = PathBuf::from(expanded);
        if !path.is_absolute() {
            return Err(DeployError::RelativeDestination { path });
        }
        Ok(path)
    }
}
