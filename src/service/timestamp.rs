use crate::models::error::{DeployError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed width, no characters that are illegal in file names. The UTC offset keeps the
/// hour repeated when daylight saving time ends from reusing earlier names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%z";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Timestamp(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp(value.to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait TimestampProvider: Send + Sync {
    fn now(&self) -> Result<Timestamp>;
}

/// Reads the system clock in local time
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl TimestampProvider for LocalClock {
    fn now(&self) -> Result<Timestamp> {
        let now = SystemTime::now();
        now.duration_since(UNIX_EPOCH)
            .map_err(|cause| DeployError::Clock { cause })?;
        let local: DateTime<Local> = now.into();
        Ok(Timestamp::from_datetime(&local))
    }
}

/// Always returns the same value
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedClock(pub &'static str);

#[cfg(test)]
impl TimestampProvider for FixedClock {
    fn now(&self) -> Result<Timestamp> {
        Ok(Timestamp::from(self.0))
    }
}
