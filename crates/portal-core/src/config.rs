//! Configuration traits
//!
//! Application configs implement these so every binary loads, layers and
//! validates configuration the same way: defaults, then file, then
//! environment, then validation.

use crate::PortalError;

/// Trait for configuration defaults
pub trait ConfigDefaults {
    /// Get default values for this configuration
    fn defaults() -> Self;
}

/// Trait for configuration merging
pub trait ConfigMerge {
    /// Overlay environment variables with the given prefix onto this config
    fn merge_with_env(&mut self, prefix: &str) -> Result<(), PortalError>;
}

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<(), PortalError>;
}

/// Parse an environment override, naming the variable in the error.
pub fn parse_env_value<T>(var: &str, raw: &str) -> Result<T, PortalError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| PortalError::config(format!("{var}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_value() {
        let v: u64 = parse_env_value("PORTAL_X", " 42 ").unwrap();
        assert_eq!(v, 42);

        let err = parse_env_value::<u64>("PORTAL_X", "nope").unwrap_err();
        assert!(err.to_string().contains("PORTAL_X"));
    }
}
