// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Validation of the names given to virtual nodes and flow conditions

use crate::{ConfigError, ConfigResult};

/// Maximum length of a name.
pub const MAX_NAME_LEN: usize = 31;

/// Check that `name` is a legal name for an object of kind `what`.
///
/// A legal name has 1 to [`MAX_NAME_LEN`] characters, all of them ASCII alphanumerics or
/// underscores, and starts with an alphanumeric character.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidName`] describing the first violation found.
pub fn validate_name(what: &'static str, name: &str) -> ConfigResult {
    let invalid = |reason| ConfigError::InvalidName {
        what,
        name: name.to_string(),
        reason,
    };
    let Some(first) = name.chars().next() else {
        return Err(invalid("empty"));
    };
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("too long"));
    }
    if !first.is_ascii_alphanumeric() {
        return Err(invalid("must start with an alphanumeric character"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("illegal character"));
    }
    Ok(())
}

/// Like [`validate_name`], for an optional name that is mandatory.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] if `name` is `None`, or the error of
/// [`validate_name`].
pub fn require_name<'a>(what: &'static str, name: Option<&'a str>) -> ConfigResult<&'a str> {
    let name = name.ok_or(ConfigError::MissingField(what))?;
    validate_name(what, name)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_valid_names() {
        for name in ["a", "cond1", "tenant_1", "0bridge", "A234567890123456789012345678901"] {
            assert!(validate_name("test", name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "",
            "_cond",
            "cond-1",
            "cond 1",
            "condé",
            "A2345678901234567890123456789012",
        ] {
            let err = validate_name("test", name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadArgument, "{name}");
        }
    }

    #[test]
    fn test_require_name() {
        assert_eq!(
            require_name("flow condition name", None),
            Err(ConfigError::MissingField("flow condition name"))
        );
        assert_eq!(require_name("flow condition name", Some("c1")), Ok("c1"));
    }
}
