//! Unit tests for core components
//!
//! Tests individual modules and functions in isolation.

mod common;

use kotel2influx::client::typing::{default_overrides, retype, RegisterValue, TypeOverrides};
use kotel2influx::client::PageId;
use kotel2influx::config::AppConfig;
use kotel2influx::error::KotelError;

// Configuration Tests
#[test]
fn test_app_config_validation() {
    let mut config = AppConfig::default();

    // Default configuration should pass
    assert!(config.validate().is_ok());

    // Invalid URL scheme should fail
    config.device.url = "ftp://invalid.url".parse().unwrap();
    assert!(config.validate().is_err());

    // Empty username should fail
    config.device.url = "http://valid.url".parse().unwrap();
    config.device.username = "".to_string();
    assert!(config.validate().is_err());

    // Zero timeout should fail
    config.device.username = "user".to_string();
    config.device.timeout = std::time::Duration::from_secs(0);
    assert!(config.validate().is_err());

    // Zero poll interval should fail
    config.device.timeout = std::time::Duration::from_secs(3);
    config.job.interval = std::time::Duration::from_secs(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_config_defaults_match_device_conventions() {
    let config = AppConfig::default();
    assert_eq!(config.device.username, "user");
    assert_eq!(config.device.password, "00000000");
    assert_eq!(config.device.timeout, std::time::Duration::from_secs(3));
    assert_eq!(config.job.interval, std::time::Duration::from_secs(60));
    assert!(config.influx.prefix.is_empty());
}

// Error Handling Tests
#[test]
fn test_error_display() {
    let error = KotelError::missing_register("statuses", "__R24261.0_BOOL_i");
    let error_string = format!("{error}");
    assert!(error_string.contains("__R24261.0_BOOL_i"));
    assert!(error_string.contains("statuses"));
    assert!(error.is_missing_register());

    let error = KotelError::connection("Device unreachable");
    assert!(format!("{error}").contains("Connection error"));
    assert!(!error.is_missing_register());
}

// Register Typing Tests
#[test]
fn test_typing_is_total_over_register_names() {
    let overrides = TypeOverrides::new();
    // A marker-less name never fails, whatever the raw text looks like.
    for raw in ["", "garbage", "12:34:56", "1.5e3"] {
        let value = retype("__R1_UNKNOWN_x", raw, &overrides).unwrap();
        assert_eq!(value, RegisterValue::Text(raw.to_string()));
    }
}

#[test]
fn test_typing_marker_priority() {
    let overrides = TypeOverrides::new();

    // A name carrying several markers resolves in BOOL, REAL, INT order.
    assert_eq!(
        retype("__R1_BOOL_REAL_i", "1", &overrides).unwrap(),
        RegisterValue::Integer(1)
    );
    assert_eq!(
        retype("__R2_REAL_UDINT_x", "1.5", &overrides).unwrap(),
        RegisterValue::Float(1.5)
    );
    assert_eq!(
        retype("__R3_UDINT_u", "42", &overrides).unwrap(),
        RegisterValue::Integer(42)
    );
}

#[test]
fn test_typing_override_precedence() {
    let overrides = default_overrides();
    // Without the override this register would type as integer.
    assert_eq!(
        retype("__R23658_UDINT_u", "3600", &overrides).unwrap(),
        RegisterValue::Float(3600.0)
    );
    // Other registers are untouched by the override table.
    assert_eq!(
        retype("__R23659_UDINT_u", "3600", &overrides).unwrap(),
        RegisterValue::Integer(3600)
    );
}

#[test]
fn test_typing_is_deterministic() {
    let overrides = default_overrides();
    let first = retype("__R23596_REAL_.1f", "21.5", &overrides).unwrap();
    let second = retype("__R23596_REAL_.1f", "21.5", &overrides).unwrap();
    assert_eq!(first, second);
}

// Page Identifier Tests
#[test]
fn test_page_resources() {
    assert_eq!(PageId::Heating.resource(), "PAGE215.XML");
    assert_eq!(PageId::HotWater.resource(), "PAGE213.XML");
    assert_eq!(PageId::Compressor.resource(), "PAGE214.XML");
    assert_eq!(PageId::Boiler.resource(), "PAGE218.XML");
    assert_eq!(PageId::Temperatures.resource(), "PAGE210.XML");
    assert_eq!(PageId::Statuses.resource(), "PAGE211.XML");
    assert_eq!(PageId::ALL.len(), 6);
}
