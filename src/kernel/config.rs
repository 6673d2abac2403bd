/*!
 * Kernel Configuration
 *
 * Boot-time configuration for tick rate and thread defaults
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_STACK_SIZE, DEFAULT_TICK_FREQUENCY, HIGH_RES_TICK_FREQUENCY, HOST_MIN_STACK_SIZE,
    MICROS_PER_SEC, MIN_STACK_SIZE,
};
use crate::core::types::Priority;
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::sync::OnceLock;
use tracing::debug;

const ENV_TICK_HZ: &str = "RTOS_STD_TICK_HZ";
const ENV_DEFAULT_PRIORITY: &str = "RTOS_STD_DEFAULT_PRIORITY";
const ENV_STACK_SIZE: &str = "RTOS_STD_STACK_SIZE";

static CONFIG: OnceLock<KernelConfig> = OnceLock::new();

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// System tick frequency in Hz
    pub tick_frequency: u32,
    /// Priority given to threads launched without an explicit one
    pub default_priority: Priority,
    /// Stack budget given to threads launched without an explicit one
    pub default_stack_size: usize,
    /// Floor applied to stack budgets when backing threads with host threads
    pub host_min_stack: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tick_frequency: DEFAULT_TICK_FREQUENCY,
            default_priority: Priority::NORMAL,
            default_stack_size: DEFAULT_STACK_SIZE,
            host_min_stack: HOST_MIN_STACK_SIZE,
        }
    }
}

impl KernelConfig {
    /// Configuration with a 1us tick, for fine-grained timeouts
    pub const fn high_resolution() -> Self {
        Self {
            tick_frequency: HIGH_RES_TICK_FREQUENCY,
            default_priority: Priority::NORMAL,
            default_stack_size: DEFAULT_STACK_SIZE,
            host_min_stack: HOST_MIN_STACK_SIZE,
        }
    }

    /// Defaults overridden by `RTOS_STD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(hz) = read_env::<u32>(ENV_TICK_HZ)? {
            config.tick_frequency = hz;
        }
        if let Some(level) = read_env::<u8>(ENV_DEFAULT_PRIORITY)? {
            config.default_priority = Priority::new(level)?;
        }
        if let Some(size) = read_env::<usize>(ENV_STACK_SIZE)? {
            config.default_stack_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_frequency == 0 || self.tick_frequency as u64 > MICROS_PER_SEC {
            return Err(ConfigError::InvalidTickFrequency(self.tick_frequency));
        }
        if self.default_stack_size < MIN_STACK_SIZE {
            return Err(ConfigError::InvalidStackSize(self.default_stack_size));
        }
        Ok(())
    }

    /// Stack size actually requested from the host for a given budget
    pub(crate) fn host_stack(&self, budget: usize) -> usize {
        budget.max(self.host_min_stack)
    }
}

fn read_env<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidEnv {
            var,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

/// Install the kernel configuration
///
/// Only the first call takes effect; returns `false` if a configuration was
/// already in place (explicitly or by first use of the kernel).
pub fn init(config: KernelConfig) -> Result<bool, ConfigError> {
    config.validate()?;
    let mut installed = false;
    CONFIG.get_or_init(|| {
        installed = true;
        config
    });
    debug!(installed, "Kernel configuration");
    Ok(installed)
}

/// Active kernel configuration (defaults if `init` was never called)
pub fn config() -> &'static KernelConfig {
    CONFIG.get_or_init(KernelConfig::default)
}
