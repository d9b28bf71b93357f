use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not determine the current user: {0}")]
    IdentityResolution(String),

    #[error("System clock is unreadable: {cause}")]
    Clock { cause: std::time::SystemTimeError },

    #[error("Replacement file '{path}' does not exist or is not a regular file")]
    SourceMissing { path: PathBuf },

    #[error("Replacement file '{source_path}' is the installed file '{destination}' itself")]
    SameFile {
        source_path: PathBuf,
        destination: PathBuf,
    },

    #[error("Destination '{path}' does not resolve to an absolute path")]
    RelativeDestination { path: PathBuf },

    #[error("Failed to back up '{from}' to '{to}': {cause}")]
    BackupIo {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {cause}")]
    DeployIo {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_paths() {
        let err = DeployError::DeployIo {
            from: PathBuf::from("/src/B.new"),
            to: PathBuf::from("/cfg/B"),
            cause: io::Error::new(io::ErrorKind::NotFound, "missing directory"),
        };
        let message = err.to_string();
        assert!(message.contains("/src/B.new"));
        assert!(message.contains("/cfg/B"));
        assert!(message.contains("missing directory"));
    }
}
