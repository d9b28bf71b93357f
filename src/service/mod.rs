pub mod backup;
pub mod deployer;
pub mod identity;
pub mod path_resolver;
pub mod timestamp;
