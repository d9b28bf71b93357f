use crate::models::deploy_report::{DeploymentReport, PairOutcome, PairResult, PairState};
use crate::models::deployment_pair::DeploymentPair;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::error::{DeployError, Result};
use crate::service::backup::BackupManager;
use crate::service::identity::IdentityProvider;
use crate::service::path_resolver::PathResolver;
use crate::service::timestamp::TimestampProvider;
use indicatif::ProgressBar;
use log::{debug, error, info};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Backs up and replaces each destination in turn.
pub struct Deployer {
    identity: Box<dyn IdentityProvider>,
    clock: Box<dyn TimestampProvider>,
    dry_run_mode: DryRunMode,
    max_threads: usize,
}

impl Deployer {
    pub fn new(identity: Box<dyn IdentityProvider>, clock: Box<dyn TimestampProvider>) -> Self {
        Deployer {
            identity,
            clock,
            dry_run_mode: DryRunMode::None,
            max_threads: 1,
        }
    }

    pub fn dry_run_mode(mut self, mode: DryRunMode) -> Self {
        self.dry_run_mode = mode;
        self
    }

    pub fn max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    /// Runs every pair and returns their outcomes in input order.
    ///
    /// Only run-wide problems (user identity, clock, thread pool) are returned as errors;
    /// per-pair failures end up in the report.
    pub fn deploy(
        &self,
        pairs: &[DeploymentPair],
        progress: Option<&ProgressBar>,
    ) -> Result<DeploymentReport> {
        let resolver = PathResolver::for_pairs(self.identity.as_ref(), pairs)?;
        // One timestamp for the whole run so its backups form one version.
        let timestamp = self.clock.now()?;
        let backups = BackupManager::new(timestamp.clone());
        info!(
            "{}Deploying {} file(s), backup timestamp {}",
            self.dry_run_mode.progress_prefix(),
            pairs.len(),
            timestamp
        );

        let run_pair = |pair: &DeploymentPair| {
            let outcome = self.deploy_pair(pair, &resolver, &backups);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            outcome
        };

        let outcomes: Vec<PairOutcome> = if self.max_threads > 1 && pairs.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.max_threads)
                .build()?;
            pool.install(|| pairs.par_iter().map(run_pair).collect())
        } else {
            pairs.iter().map(run_pair).collect()
        };

        Ok(DeploymentReport { timestamp, outcomes })
    }

    fn deploy_pair(
        &self,
        pair: &DeploymentPair,
        resolver: &PathResolver,
        backups: &BackupManager,
    ) -> PairOutcome {
        debug!("{}: {}", pair, PairState::Pending);

        let destination = match resolver.resolve(&pair.destination) {
            Ok(path) => path,
            Err(e) => return finish(pair, None, PairResult::DeployFailed(e)),
        };

        if !pair.source.is_file() {
            let e = DeployError::SourceMissing {
                path: pair.source.clone(),
            };
            return finish(pair, Some(destination), PairResult::DeployFailed(e));
        }

        // Copying a file onto itself truncates it before it is read.
        match is_same_file(&pair.source, &destination) {
            Ok(false) => {}
            Ok(true) => {
                let e = DeployError::SameFile {
                    source_path: pair.source.clone(),
                    destination: destination.clone(),
                };
                return finish(pair, Some(destination), PairResult::DeployFailed(e));
            }
            Err(cause) => {
                let e = DeployError::DeployIo {
                    from: pair.source.clone(),
                    to: destination.clone(),
                    cause,
                };
                return finish(pair, Some(destination), PairResult::DeployFailed(e));
            }
        }

        debug!("{}: {}", pair, PairState::BackingUp);
        if !self.dry_run_mode.should_write_files() {
            let result = match backups.planned_backup(&destination) {
                Ok(backup_path) => PairResult::Simulated { backup_path },
                Err(e) => PairResult::BackupFailed(e),
            };
            return finish(pair, Some(destination), result);
        }

        let backup = match backups.backup(&destination) {
            Ok(record) => record,
            Err(e) => return finish(pair, Some(destination), PairResult::BackupFailed(e)),
        };

        debug!("{}: {}", pair, PairState::Deploying);
        let result = match copy_over(&pair.source, &destination) {
            Ok(bytes_written) => {
                info!(
                    "Deployed {} to {} ({} bytes)",
                    pair.source.display(),
                    destination.display(),
                    bytes_written
                );
                PairResult::Deployed {
                    backup,
                    bytes_written,
                }
            }
            Err(e) => PairResult::DeployFailed(e),
        };
        finish(pair, Some(destination), result)
    }
}

/// True if both paths name the same file, following symlinks and hard links.
/// A destination that does not exist yet is never the source.
fn is_same_file(source: &Path, destination: &Path) -> io::Result<bool> {
    if !destination.try_exists()? {
        return Ok(false);
    }
    #[cfg(unix)]
    let same = {
        use std::os::unix::fs::MetadataExt;
        let source_meta = fs::metadata(source)?;
        let destination_meta = fs::metadata(destination)?;
        source_meta.dev() == destination_meta.dev() && source_meta.ino() == destination_meta.ino()
    };
    #[cfg(not(unix))]
    let same = fs::canonicalize(source)? == fs::canonicalize(destination)?;

    Ok(same)
}

/// Replaces the destination's content with the source's; `fs::copy` truncates first.
fn copy_over(source: &Path, destination: &Path) -> Result<u64> {
    fs::copy(source, destination).map_err(|cause| DeployError::DeployIo {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        cause,
    })
}

fn finish(pair: &DeploymentPair, destination: Option<PathBuf>, result: PairResult) -> PairOutcome {
    debug_assert!(result.state().is_terminal());
    match result.error() {
        Some(e) => error!("{}: {}: {}", pair, result.state(), e),
        None => debug!("{}: {}", pair, result.state()),
    }
    PairOutcome {
        pair: pair.clone(),
        destination,
        result,
    }
}
