use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;
use tracing_subscriber::EnvFilter;
use weatherbot_core::{
    Adapter, Config, OpenWeatherProvider, TelegramTransport, Units, WeatherBot, WeatherIcons,
    WeatherProvider, format_report,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Telegram weather bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Telegram bot token and OpenWeather API key.
    Configure,

    /// Run the bot until interrupted.
    Run {
        /// Overrides the configured Telegram bot token.
        #[arg(long)]
        telegram_token: Option<String>,

        /// Overrides the configured OpenWeather API key.
        #[arg(long)]
        openweather_key: Option<String>,
    },

    /// Print the report the bot would send for a city.
    Show {
        /// City name, passed to the weather service as is.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        config.apply_env();

        match self.command {
            Command::Configure => configure(config),
            Command::Run { telegram_token, openweather_key } => {
                if telegram_token.is_some() {
                    config.telegram.token = telegram_token;
                }
                if openweather_key.is_some() {
                    config.openweather.api_key = openweather_key;
                }
                init_tracing(&config.log_level);
                run_bot(&config).await
            }
            Command::Show { city } => {
                init_tracing(&config.log_level);
                show(&config, &city).await
            }
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let token = Password::new("Telegram bot token:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read Telegram bot token")?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read OpenWeather API key")?;

    config.telegram.token = Some(token.trim().to_string());
    config.openweather.api_key = Some(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let mut provider =
        OpenWeatherProvider::new(Units::Celsius, "en", config.openweather_key()?.to_string())?;
    if let Some(endpoint) = &config.openweather.endpoint {
        provider = provider.with_endpoint(endpoint.as_str());
    }
    Ok(provider)
}

async fn run_bot(config: &Config) -> anyhow::Result<()> {
    let token = config.telegram_token()?;
    let adapter = match config.openweather.endpoint {
        None => Adapter::new(token, config.openweather_key()?)?,
        Some(_) => Adapter::from_parts(
            Arc::new(TelegramTransport::new(token)),
            Arc::new(build_provider(config)?),
        ),
    };

    info!("weatherbot starting");
    Arc::new(adapter).start().await?;
    info!("weatherbot stopped");
    Ok(())
}

async fn show(config: &Config, city: &str) -> anyhow::Result<()> {
    let provider = build_provider(config)?;
    let weather = provider.current_by_name(city).await?;
    let icon = weather.primary_category().map(|c| WeatherIcons::new().icon_for(c)).unwrap_or("");

    println!("{}", format_report(city, weather.temperature, icon));

    let description = weather
        .conditions
        .first()
        .map(|c| c.description.as_str())
        .unwrap_or("unknown");
    println!(
        "{}: feels like {:.1} °C, humidity {}%, {} (observed {})",
        weather.location_name,
        weather.feels_like,
        weather.humidity_pct,
        description,
        weather.observed_at.format("%Y-%m-%d %H:%M UTC"),
    );

    Ok(())
}
