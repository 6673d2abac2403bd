/*!
 * Error Types
 * Construction-time errors with thiserror and miette support
 *
 * Contract violations are not errors: they halt the kernel (see `kernel::halt`).
 * Timeouts are not errors either: they are ordinary return values.
 */

use miette::Diagnostic;
use thiserror::Error;

/// Invalid kernel or thread configuration
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Priority {0} is out of range")]
    #[diagnostic(
        code(config::invalid_priority),
        help("Application priorities run from 1 (low) to 255 (high); 0 is reserved for idle.")
    )]
    InvalidPriority(u8),

    #[error("Tick frequency {0}Hz is out of range")]
    #[diagnostic(
        code(config::invalid_tick_frequency),
        help("Use a frequency between 1Hz and 1MHz.")
    )]
    InvalidTickFrequency(u32),

    #[error("Stack size {0} is too small")]
    #[diagnostic(
        code(config::invalid_stack_size),
        help("Thread stacks need at least a few dozen bytes for the entry frame.")
    )]
    InvalidStackSize(usize),

    #[error("Environment variable {var} has unparsable value {value:?}")]
    #[diagnostic(
        code(config::invalid_env),
        help("Unset the variable or give it a plain decimal number.")
    )]
    InvalidEnv { var: &'static str, value: String },
}

/// Thread creation failures
#[derive(Error, Debug, Diagnostic)]
pub enum SpawnError {
    #[error("Host refused to create thread {name:?}: {source}")]
    #[diagnostic(
        code(thread::spawn_failed),
        help("The host may be out of memory or thread handles. Reduce the number of live threads.")
    )]
    Host {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::InvalidPriority(0).to_string(),
            "Priority 0 is out of range"
        );
        let err = ConfigError::InvalidEnv {
            var: "RTOS_STD_TICK_HZ",
            value: "fast".into(),
        };
        assert!(err.to_string().contains("RTOS_STD_TICK_HZ"));
    }

    #[test]
    fn test_spawn_error_from_config() {
        let err: SpawnError = ConfigError::InvalidStackSize(4).into();
        assert!(matches!(err, SpawnError::Config(ConfigError::InvalidStackSize(4))));
    }
}
