//! Enumeration types for the Axiom Trade API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookback window for the trending tokens feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimePeriod {
    /// Last hour
    #[serde(rename = "1h")]
    #[default]
    OneHour,
    /// Last 24 hours
    #[serde(rename = "24h")]
    OneDay,
    /// Last 7 days
    #[serde(rename = "7d")]
    OneWeek,
}

impl TimePeriod {
    /// Query-string value understood by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::OneHour => "1h",
            TimePeriod::OneDay => "24h",
            TimePeriod::OneWeek => "7d",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimePeriod {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "1h" => Ok(TimePeriod::OneHour),
            "24h" => Ok(TimePeriod::OneDay),
            "7d" => Ok(TimePeriod::OneWeek),
            other => Err(crate::Error::InvalidInput(format!(
                "Invalid time period: {}. Expected 1h, 24h or 7d",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_period_parse() {
        assert_eq!("24h".parse::<TimePeriod>().unwrap(), TimePeriod::OneDay);
        assert!("30d".parse::<TimePeriod>().is_err());
    }

    #[test]
    fn test_time_period_serde() {
        let json = serde_json::to_string(&TimePeriod::OneWeek).unwrap();
        assert_eq!(json, "\"7d\"");
    }
}
