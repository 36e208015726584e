use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, err, ok};
use serial_test::serial;

// =========================================================================
// Validation Tests - Api
// =========================================================================

#[test]
#[serial]
fn given_base_url_without_scheme_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _url = EnvGuard::set("DW_API_BASE_URL", "127.0.0.1:8000");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring("api.base_url"));
}

#[test]
#[serial]
fn given_login_path_without_leading_slash_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _path = EnvGuard::set("DW_API_LOGIN_PATH", "auth/login");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_timeout_zero_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _timeout = EnvGuard::set("DW_API_TIMEOUT_SECS", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_timeout_over_max_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _timeout = EnvGuard::set("DW_API_TIMEOUT_SECS", "301");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_https_base_url_when_validate_then_ok() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _url = EnvGuard::set("DW_API_BASE_URL", "https://intel.example.org/api");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, ok(anything()));
}
