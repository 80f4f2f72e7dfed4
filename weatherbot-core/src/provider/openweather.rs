use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::BotError,
    model::{Condition, CurrentWeather},
    provider::{Units, validate_api_key, validate_language},
};

use super::WeatherProvider;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    lang: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Validates the configuration up front; the key itself is only checked
    /// remotely on the first lookup.
    pub fn new(units: Units, lang: &str, api_key: String) -> Result<Self, BotError> {
        validate_language(lang)?;
        validate_api_key(&api_key)?;

        Ok(Self {
            api_key,
            units,
            lang: lang.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http: Client::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather> {
        let url = format!("{}/data/2.5/weather", self.endpoint);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        debug!(city, %status, "OpenWeather current weather received");

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

fn parse_current(body: &str) -> Result<CurrentWeather> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current JSON")?;

    let observed_at = DateTime::<Utc>::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

    let conditions = parsed
        .weather
        .into_iter()
        .map(|w| Condition { category: w.main, description: w.description })
        .collect();

    Ok(CurrentWeather {
        location_name: parsed.name,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        conditions,
        observed_at,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_name(&self, city: &str) -> Result<CurrentWeather> {
        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
