use crate::{CurrentWeather, error::BotError};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;

/// Language codes accepted by the OpenWeather `lang` parameter.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "al", "ar", "az", "bg", "ca", "cz", "da", "de", "el", "en", "eu", "fa", "fi", "fr",
    "gl", "he", "hi", "hr", "hu", "id", "it", "ja", "kr", "la", "lt", "mk", "no", "nl", "pl",
    "pt", "pt_br", "ro", "ru", "sv", "se", "sk", "sl", "sp", "es", "sr", "th", "tr", "ua", "uk",
    "vi", "zh_cn", "zh_tw", "zu",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Units {
    /// Single-letter unit code, "C", "F" or "K".
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Celsius => "C",
            Units::Fahrenheit => "F",
            Units::Kelvin => "K",
        }
    }

    /// Value of the OpenWeather `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Celsius => "metric",
            Units::Fahrenheit => "imperial",
            Units::Kelvin => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Celsius, Units::Fahrenheit, Units::Kelvin]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = BotError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "C" => Ok(Units::Celsius),
            "F" => Ok(Units::Fahrenheit),
            "K" => Ok(Units::Kelvin),
            _ => Err(BotError::configuration(format!(
                "Unknown units '{value}'. Supported units: C, F, K."
            ))),
        }
    }
}

pub fn validate_language(lang: &str) -> Result<(), BotError> {
    if SUPPORTED_LANGUAGES.contains(&lang) {
        Ok(())
    } else {
        Err(BotError::configuration(format!("Unsupported language '{lang}'.")))
    }
}

/// API keys are 32 ASCII alphanumeric characters.
pub fn validate_api_key(key: &str) -> Result<(), BotError> {
    if key.is_empty() {
        return Err(BotError::configuration("Weather API key is empty."));
    }
    if key.len() != 32 {
        return Err(BotError::configuration(format!(
            "Invalid weather API key length: expected 32 characters, got {}.",
            key.len()
        )));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BotError::configuration(
            "Weather API key must contain only ASCII letters and digits.",
        ));
    }
    Ok(())
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a city, looked up by its name exactly as given.
    async fn current_by_name(&self, city: &str) -> anyhow::Result<CurrentWeather>;
}
