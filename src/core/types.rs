/*!
 * Core Types
 * Common types used across the kernel port and the sync layer
 */

use super::errors::ConfigError;
use super::limits::{HIGH_PRIORITY, LOW_PRIORITY, NORMAL_PRIORITY};
use serde::{Deserialize, Serialize};
use std::fmt;

/// System time and timeout intervals, in kernel ticks
pub type Ticks = u64;

/// Thread priority (1-255, higher runs first; 0 is reserved for idle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const LOW: Priority = Priority(LOW_PRIORITY);
    pub const NORMAL: Priority = Priority(NORMAL_PRIORITY);
    pub const HIGH: Priority = Priority(HIGH_PRIORITY);

    /// Validate a raw priority level
    pub fn new(level: u8) -> Result<Self, ConfigError> {
        if level < LOW_PRIORITY {
            return Err(ConfigError::InvalidPriority(level));
        }
        Ok(Self(level))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<u8> for Priority {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
