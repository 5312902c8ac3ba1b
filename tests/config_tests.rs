//! Board profiles, validation and persisted overrides

use rust_ook_opener::config::nvs::{
    ConfigOverrides, COOLDOWN_KEY, CURRENT_SCHEMA_VERSION, NVS_NAMESPACE, REPEAT_KEY, VERSION_KEY,
};
use rust_ook_opener::config::{
    BoardProfile, IndicatorWiring, TransmitConfig, MAX_COOLDOWN_MS, MAX_REPEAT_COUNT,
};
use rust_ook_opener::signal::{COOLDOWN_MS, REPEAT_COUNT, SYMBOL_RATE_HZ};
use rust_ook_opener::{ConfigError, IdlePattern};

#[test]
fn test_devkit_profile() {
    let config = TransmitConfig::for_board(BoardProfile::DevKit);
    assert_eq!(config.frequency_hz, SYMBOL_RATE_HZ);
    assert_eq!(config.repeat_count, REPEAT_COUNT);
    assert_eq!(config.cooldown_ms, COOLDOWN_MS);
    assert_eq!(config.pass_delay_ms, 0);
    assert_eq!(config.idle_pattern, IdlePattern::SolidOff);
    assert_eq!(config.indicator, IndicatorWiring::Single { pin: 2, active_low: false });
}

#[test]
fn test_rgb_profile() {
    let config = TransmitConfig::for_board(BoardProfile::RgbLed);
    assert_eq!(
        config.indicator,
        IndicatorWiring::Rgb { red: 18, green: 19, blue: 20, active_low: true }
    );
    assert_eq!(config.idle_pattern.duration_ms(), 2000);
    assert!(config.idle_pattern.duration_ms() <= config.cooldown_ms);
}

#[test]
fn test_selected_profile_is_default() {
    assert_eq!(
        TransmitConfig::default(),
        TransmitConfig::for_board(BoardProfile::selected())
    );
    #[cfg(not(feature = "rgb-indicator"))]
    assert_eq!(BoardProfile::selected(), BoardProfile::DevKit);
}

#[test]
fn test_validate_returns_exact_timing() {
    let timing = TransmitConfig::for_board(BoardProfile::DevKit).validate().unwrap();
    assert_eq!(timing.clock_divider, 1);
    assert_eq!(timing.ticks_per_symbol, 32_000);
    assert_eq!(timing.period_us(), 400);
}

#[test]
fn test_indicator_pin_conflicts() {
    let wiring = IndicatorWiring::Rgb { red: 18, green: 19, blue: 20, active_low: true };
    assert!(wiring.uses_pin(19));
    assert!(!wiring.uses_pin(4));
    assert!(!IndicatorWiring::None.uses_pin(0));

    let config = TransmitConfig {
        output_pin: 20,
        ..TransmitConfig::for_board(BoardProfile::RgbLed)
    };
    assert_eq!(config.validate(), Err(ConfigError::PinConflict { pin: 20 }));
}

#[test]
fn test_overrides_bounds() {
    let base = TransmitConfig::for_board(BoardProfile::DevKit);

    let max = base.with_overrides(&ConfigOverrides {
        repeat_count: Some(MAX_REPEAT_COUNT),
        cooldown_ms: Some(MAX_COOLDOWN_MS),
    });
    assert_eq!(max.repeat_count, MAX_REPEAT_COUNT);
    assert_eq!(max.cooldown_ms, MAX_COOLDOWN_MS);

    let over = base.with_overrides(&ConfigOverrides {
        repeat_count: Some(MAX_REPEAT_COUNT + 1),
        cooldown_ms: None,
    });
    assert_eq!(over.repeat_count, base.repeat_count);

    // Zero cooldown is allowed; zero repeats are not
    let zero = base.with_overrides(&ConfigOverrides {
        repeat_count: Some(0),
        cooldown_ms: Some(0),
    });
    assert_eq!(zero.repeat_count, base.repeat_count);
    assert_eq!(zero.cooldown_ms, 0);
    assert!(zero.validate().is_ok());
}

#[test]
fn test_error_display() {
    assert_eq!(
        format!("{}", ConfigError::PinConflict { pin: 2 }),
        "C02: output pin shared with indicator (GPIO2)"
    );
    assert_eq!(
        format!("{}", ConfigError::InvalidRepeatCount),
        "C04: repeat count must be >= 1"
    );
    assert_eq!(
        format!("{}", ConfigError::Driver { code: 258 }),
        "C06: driver error (esp_err 258)"
    );
}

#[test]
fn test_nvs_provisioning_layout() {
    // Names a flash-time provisioning CSV must use
    assert_eq!(NVS_NAMESPACE, "ook_tx");
    assert_eq!(VERSION_KEY, "schema_ver");
    assert_eq!(REPEAT_KEY, "repeat");
    assert_eq!(COOLDOWN_KEY, "cooldown_ms");
    assert_eq!(CURRENT_SCHEMA_VERSION, 1);
}

#[test]
#[cfg(not(target_os = "espidf"))]
fn test_nvs_unavailable_on_host() {
    use rust_ook_opener::config::nvs::{load_overrides, NvsError};

    assert!(matches!(load_overrides(), Err(NvsError::NotAvailable)));
}
