use crate::models::backup_record::BackupRecord;
use crate::models::deployment_pair::DeploymentPair;
use crate::models::error::DeployError;
use crate::service::timestamp::Timestamp;
use crate::utils::progress::format_bytes;
use std::fmt;
use std::path::PathBuf;

/// Lifecycle of a single pair within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Pending,
    BackingUp,
    Deploying,
    BackupFailed,
    Deployed,
    DeployFailed,
}

impl PairState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PairState::BackupFailed | PairState::Deployed | PairState::DeployFailed
        )
    }
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairState::Pending => "pending",
            PairState::BackingUp => "backing up",
            PairState::Deploying => "deploying",
            PairState::BackupFailed => "backup failed",
            PairState::Deployed => "deployed",
            PairState::DeployFailed => "deploy failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum PairResult {
    Deployed {
        backup: Option<BackupRecord>,
        bytes_written: u64,
    },
    /// Dry run: everything checked out, nothing was written
    Simulated { backup_path: Option<PathBuf> },
    BackupFailed(DeployError),
    DeployFailed(DeployError),
}

impl PairResult {
    pub fn state(&self) -> PairState {
        match self {
            PairResult::Deployed { .. } | PairResult::Simulated { .. } => PairState::Deployed,
            PairResult::BackupFailed(_) => PairState::BackupFailed,
            PairResult::DeployFailed(_) => PairState::DeployFailed,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PairResult::BackupFailed(_) | PairResult::DeployFailed(_)
        )
    }

    pub fn error(&self) -> Option<&DeployError> {
        match self {
            PairResult::BackupFailed(e) | PairResult::DeployFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct PairOutcome {
    pub pair: DeploymentPair,
    /// None when the destination template could not be resolved
    pub destination: Option<PathBuf>,
    pub result: PairResult,
}

#[derive(Debug)]
pub struct DeploymentReport {
    pub timestamp: Timestamp,
    pub outcomes: Vec<PairOutcome>,
}

impl DeploymentReport {
    pub fn deployed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.result.is_failure())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_failure()).count()
    }

    pub fn backups(&self) -> impl Iterator<Item = &BackupRecord> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            PairResult::Deployed {
                backup: Some(record),
                ..
            } => Some(record),
            _ => None,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.result {
                PairResult::Deployed { bytes_written, .. } => bytes_written,
                _ => 0,
            })
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Process exit status for this report
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deployment run {}", self.timestamp)?;
        for (idx, outcome) in self.outcomes.iter().enumerate() {
            let target = outcome
                .destination
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| outcome.pair.destination.clone());
            write!(
                f,
                "  #{} {} -> {}: ",
                idx + 1,
                outcome.pair.source.display(),
                target
            )?;
            match &outcome.result {
                PairResult::Deployed { backup, .. } => match backup {
                    Some(record) => {
                        writeln!(f, "deployed (backup: {})", record.backup_path.display())?
                    }
                    None => writeln!(f, "deployed (no previous file)")?,
                },
                PairResult::Simulated { backup_path } => match backup_path {
                    Some(path) => writeln!(f, "would deploy (backup: {})", path.display())?,
                    None => writeln!(f, "would deploy (no previous file)")?,
                },
                PairResult::BackupFailed(e) | PairResult::DeployFailed(e) => {
                    writeln!(f, "{}: {}", outcome.result.state(), e)?
                }
            }
        }
        write!(
            f,
            "{} deployed, {} failed, {} written",
            self.deployed_count(),
            self.failed_count(),
            format_bytes(self.bytes_written())
        )
    }
}
