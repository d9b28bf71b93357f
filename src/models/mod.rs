pub mod backup_record;
pub mod config;
pub mod config_validator;
pub mod deploy_report;
pub mod deployment_pair;
pub mod dry_run_mode;
pub mod error;
