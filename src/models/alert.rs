use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction an alert watches. Serialized as the `type` field of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCondition {
    #[serde(rename = "price_above")]
    Above,
    #[serde(rename = "price_below")]
    Below,
}

impl AlertCondition {
    /// Strict comparison: a price sitting exactly on the threshold never fires.
    pub fn is_crossed(self, price: f64, threshold: f64) -> bool {
        match self {
            AlertCondition::Above => price > threshold,
            AlertCondition::Below => price < threshold,
        }
    }

    /// Wording used in notifications.
    pub fn verb(self) -> &'static str {
        match self {
            AlertCondition::Above => "risen above",
            AlertCondition::Below => "dropped below",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertCondition::Above => "price_above",
            AlertCondition::Below => "price_below",
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price_above" => Ok(AlertCondition::Above),
            "price_below" => Ok(AlertCondition::Below),
            other => Err(format!("unknown alert type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: u64,
    pub coin: String,

    #[serde(rename = "type")]
    pub condition: AlertCondition,
    pub threshold: f64,

    // false once the alert has fired
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn is_triggered_by(&self, price: f64) -> bool {
        self.condition.is_crossed(price, self.threshold)
    }
}

/// Validated input for a new alert; the store fills in id, state and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub coin: String,
    pub condition: AlertCondition,
    pub threshold: f64,
}
