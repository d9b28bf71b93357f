use crate::service::path_resolver::USER_PLACEHOLDER;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A replacement file and the template of the path it gets installed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPair {
    pub source: PathBuf,
    pub destination: String,
}

impl DeploymentPair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        DeploymentPair {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Returns true if the destination template refers to the current user
    pub fn needs_identity(&self) -> bool {
        self.destination.contains(USER_PLACEHOLDER)
    }
}

impl fmt::Display for DeploymentPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.destination)
    }
}

/// Parses the `SOURCE=DESTINATION` form accepted on the command line.
impl FromStr for DeploymentPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, destination) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SOURCE=DESTINATION, got '{}'", s))?;
        let source = source.trim();
        let destination = destination.trim();
        if source.is_empty() || destination.is_empty() {
            return Err(format!(
                "both SOURCE and DESTINATION must be non-empty in '{}'",
                s
            ));
        }
        Ok(DeploymentPair::new(source, destination))
    }
}
