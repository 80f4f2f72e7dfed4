//! Core library for the `weatherbot` Telegram bot.
//!
//! This crate defines:
//! - The bot adapter and its message handlers
//! - Abstractions over the messaging transport and the weather provider
//! - Configuration & credentials handling
//!
//! It is used by `weatherbot-cli`, but any embedder can build an [`Adapter`]
//! from its own credentials or plug in its own transport.

pub mod bot;
pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod provider;
pub mod transport;

pub use bot::{Adapter, WeatherBot, format_report};
pub use config::Config;
pub use error::BotError;
pub use icons::WeatherIcons;
pub use model::{Condition, CurrentWeather, InboundMessage};
pub use provider::{Units, WeatherProvider, openweather::OpenWeatherProvider};
pub use transport::{MessageHandlers, Transport, telegram::TelegramTransport};
