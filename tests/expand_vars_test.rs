//! Tests for environment variable expansion in input and output paths

use hierfix::domain::expand_env_vars;

#[test]
fn given_path_with_dollar_var_when_expanding_then_substitutes() {
    // Arrange
    std::env::set_var("EXPAND_TEST_DATA", "/srv/clusters");

    // Act
    let result = expand_env_vars("$EXPAND_TEST_DATA/run1.csv");

    // Assert
    assert_eq!(result, "/srv/clusters/run1.csv");

    // Cleanup
    std::env::remove_var("EXPAND_TEST_DATA");
}

#[test]
fn given_path_with_braced_var_when_expanding_then_substitutes() {
    std::env::set_var("EXPAND_TEST_OUT", "/tmp/out");

    let result = expand_env_vars("${EXPAND_TEST_OUT}/tree.txt");

    assert_eq!(result, "/tmp/out/tree.txt");
    std::env::remove_var("EXPAND_TEST_OUT");
}

#[test]
fn given_unset_var_when_expanding_then_path_unchanged() {
    let result = expand_env_vars("$EXPAND_TEST_NEVER_SET/file.csv");

    assert_eq!(result, "$EXPAND_TEST_NEVER_SET/file.csv");
}

#[test]
fn given_plain_path_when_expanding_then_unchanged() {
    assert_eq!(expand_env_vars("data/run1.csv"), "data/run1.csv");
}
