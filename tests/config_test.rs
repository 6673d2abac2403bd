/*!
 * Kernel Configuration Tests
 *
 * Environment overrides are process-global, so these run serially.
 */

use rtos_std::core::limits::{DEFAULT_TICK_FREQUENCY, NORMAL_PRIORITY};
use rtos_std::{ConfigError, KernelConfig, Priority};
use serial_test::serial;

const VARS: [&str; 3] = ["RTOS_STD_TICK_HZ", "RTOS_STD_DEFAULT_PRIORITY", "RTOS_STD_STACK_SIZE"];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = KernelConfig::from_env().unwrap();
    assert_eq!(config, KernelConfig::default());
    assert_eq!(config.tick_frequency, DEFAULT_TICK_FREQUENCY);
    assert_eq!(config.default_priority.get(), NORMAL_PRIORITY);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("RTOS_STD_TICK_HZ", "1000");
    std::env::set_var("RTOS_STD_DEFAULT_PRIORITY", "64");
    std::env::set_var("RTOS_STD_STACK_SIZE", " 4096 ");

    let config = KernelConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.tick_frequency, 1000);
    assert_eq!(config.default_priority, Priority::new(64).unwrap());
    assert_eq!(config.default_stack_size, 4096);
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_env();
    std::env::set_var("RTOS_STD_TICK_HZ", "fast");
    let err = KernelConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(
        err,
        ConfigError::InvalidEnv {
            var: "RTOS_STD_TICK_HZ",
            value: "fast".into()
        }
    );

    std::env::set_var("RTOS_STD_DEFAULT_PRIORITY", "0");
    let err = KernelConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(err, ConfigError::InvalidPriority(0));

    std::env::set_var("RTOS_STD_TICK_HZ", "2000000");
    let err = KernelConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(err, ConfigError::InvalidTickFrequency(2_000_000));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_from_env_rejects_non_unicode() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    clear_env();
    std::env::set_var("RTOS_STD_STACK_SIZE", OsStr::from_bytes(b"40\xff96"));
    let err = KernelConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(
        err,
        ConfigError::InvalidEnv { var: "RTOS_STD_STACK_SIZE", .. }
    ));
}

#[test]
#[serial]
fn test_init_first_call_wins() {
    // Nothing in this test binary touches the kernel before this point
    assert!(rtos_std::kernel::init(KernelConfig::high_resolution()).unwrap());
    assert!(!rtos_std::kernel::init(KernelConfig::default()).unwrap());
    assert_eq!(rtos_std::kernel::config().tick_frequency, 1_000_000);
    assert!(rtos_std::kernel::init(KernelConfig {
        tick_frequency: 0,
        ..Default::default()
    })
    .is_err());
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: KernelConfig = serde_json::from_str(r#"{"tick_frequency": 1000, "default_priority": 200}"#).unwrap();
    assert_eq!(config.tick_frequency, 1000);
    assert_eq!(config.default_priority, Priority::new(200).unwrap());
    assert_eq!(config.default_stack_size, KernelConfig::default().default_stack_size);

    assert!(serde_json::from_str::<KernelConfig>(r#"{"default_priority": 0}"#).is_err());
}
