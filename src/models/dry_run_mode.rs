/// Defines whether a run touches the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunMode {
    /// Normal operation - back up and copy files
    None,

    /// Resolve destinations and check sources, but skip every write.
    /// Reports which backups would be created.
    Simulate,
}

impl DryRunMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, DryRunMode::Simulate)
    }

    /// Returns true if backups and deployments should actually be written
    pub fn should_write_files(&self) -> bool {
        matches!(self, DryRunMode::None)
    }

    /// Get display string for progress bars
    pub fn progress_prefix(&self) -> &'static str {
        match self {
            DryRunMode::None => "",
            DryRunMode::Simulate => "[DRY RUN] ",
        }
    }
}
