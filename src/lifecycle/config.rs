//! System configuration.

use super::error::SystemError;
use serde::{Deserialize, Serialize};

/// Knobs for a [`DocumentSystem`](super::DocumentSystem).
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Lets target-less named actions bind into the registry's global namespace.
    pub allow_global_rebinding: bool,
    /// Keep a revision log of recorded documents.
    pub record_revisions: bool,
    /// Cap on the supersede history kept per action.
    pub history_limit: Option<usize>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            allow_global_rebinding: false,
            record_revisions: true,
            history_limit: None,
        }
    }
}

impl SystemConfig {
    pub fn from_json(json: &str) -> Result<Self, SystemError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = SystemConfig::from_json(r#"{"history_limit": 5}"#).unwrap();
        assert_eq!(config.history_limit, Some(5));
        assert!(config.record_revisions);
        assert!(!config.allow_global_rebinding);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = SystemConfig::from_json(r#"{"record_revisions": "yes"}"#).unwrap_err();
        assert!(matches!(err, SystemError::InvalidConfig(_)));
    }
}
