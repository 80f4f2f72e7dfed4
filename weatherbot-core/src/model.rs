use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text message delivered by the transport, reduced to what the handlers read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

impl InboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into() }
    }
}

/// One weather condition as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Coarse group, e.g. "Rain" or "Clear".
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    /// In the units the provider was configured with.
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub conditions: Vec<Condition>,
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    pub fn primary_category(&self) -> Option<&str> {
        self.conditions.first().map(|c| c.category.as_str())
    }
}
