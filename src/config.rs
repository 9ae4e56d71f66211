//! Engine configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Rates older than this are reported as stale (4 hours)
pub const DEFAULT_RATE_STALE_AFTER_SECS: i64 = 4 * 60 * 60;

/// Decimal places used for money values shown to users
pub const DEFAULT_MONEY_SCALE: i64 = 2;

/// Tunables shared by every engine component.
///
/// All fields have defaults, so a partial document (or none at all) is valid:
///
/// ```rust
/// use tripsplit_core::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.money_scale, 2);
/// assert_eq!(config.rate_stale_after_secs, 4 * 60 * 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tolerance for money comparisons, one unit of the smallest denomination
    pub epsilon: BigDecimal,
    /// Scale that amounts are rounded to at presentation and conversion time
    pub money_scale: i64,
    /// Age after which a rate table is considered stale
    pub rate_stale_after_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: BigDecimal::new(1.into(), DEFAULT_MONEY_SCALE),
            money_scale: DEFAULT_MONEY_SCALE,
            rate_stale_after_secs: DEFAULT_RATE_STALE_AFTER_SECS,
        }
    }
}

impl EngineConfig {
    /// Staleness threshold as a chrono duration
    pub fn rate_stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rate_stale_after_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_epsilon_is_one_cent() {
        let config = EngineConfig::default();
        assert_eq!(config.epsilon, BigDecimal::from_str("0.01").unwrap());
        assert_eq!(config.rate_stale_after(), chrono::Duration::hours(4));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"money_scale": 0}"#).unwrap();
        assert_eq!(config.money_scale, 0);
        assert_eq!(config.rate_stale_after_secs, DEFAULT_RATE_STALE_AFTER_SECS);
        assert_eq!(config.epsilon, BigDecimal::from_str("0.01").unwrap());
    }
}
