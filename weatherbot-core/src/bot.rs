//! The weather bot adapter: routes chat messages to weather lookups.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::BotError,
    icons::WeatherIcons,
    model::InboundMessage,
    provider::{Units, WeatherProvider, openweather::OpenWeatherProvider},
    transport::{MessageHandlers, Transport, telegram::TelegramTransport},
};

pub const START_TEXT: &str = "Напишите мне название вашего города и я скажу вам температуру";
pub const CITY_NOT_FOUND_TEXT: &str = "Не могу найти ваш город";

const LANGUAGE: &str = "en";

/// Operations an embedder needs from a running weather bot.
#[async_trait]
pub trait WeatherBot: MessageHandlers {
    /// Runs the transport loop until it stops.
    async fn start(self: Arc<Self>) -> Result<(), BotError>;
}

pub struct Adapter {
    transport: Arc<dyn Transport>,
    weather: Arc<dyn WeatherProvider>,
    icons: WeatherIcons,
}

impl Adapter {
    /// Telegram transport plus OpenWeather in Celsius.
    pub fn new(bot_token: &str, weather_api_key: &str) -> Result<Self, BotError> {
        let provider = OpenWeatherProvider::new(Units::Celsius, LANGUAGE, weather_api_key.to_string())?;
        Ok(Self::from_parts(Arc::new(TelegramTransport::new(bot_token)), Arc::new(provider)))
    }

    pub fn from_parts(transport: Arc<dyn Transport>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { transport, weather, icons: WeatherIcons::new() }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            warn!(chat_id, error = %e, "failed to send reply");
        }
    }

    async fn report(&self, city: &str) -> Result<String, BotError> {
        let weather = self.weather.current_by_name(city).await.map_err(BotError::Lookup)?;
        let icon = weather.primary_category().map(|c| self.icons.icon_for(c)).unwrap_or("");
        Ok(format_report(city, weather.temperature, icon))
    }
}

/// Reply line for a successful lookup. `city` is echoed as the user typed it.
pub fn format_report(city: &str, temperature: f64, icon: &str) -> String {
    format!("В городе {city} {temperature:.2} С° {icon}")
}

#[async_trait]
impl MessageHandlers for Adapter {
    async fn start_handler(&self, message: &InboundMessage) {
        self.reply(message.chat_id, START_TEXT).await;
    }

    async fn weather_handler(&self, message: &InboundMessage) {
        match self.report(&message.text).await {
            Ok(text) => self.reply(message.chat_id, &text).await,
            Err(e) => {
                debug!(chat_id = message.chat_id, error = %e, "weather lookup failed");
                self.reply(message.chat_id, CITY_NOT_FOUND_TEXT).await;
            }
        }
    }
}

#[async_trait]
impl WeatherBot for Adapter {
    async fn start(self: Arc<Self>) -> Result<(), BotError> {
        let transport = Arc::clone(&self.transport);
        transport.listen_and_serve(self).await.map_err(BotError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, CurrentWeather};
    use anyhow::anyhow;
    use chrono::Utc;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(i64, String)>>,
        fail_sends: bool,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            if self.fail_sends { Err(anyhow!("network down")) } else { Ok(()) }
        }

        async fn listen_and_serve(&self, handlers: Arc<dyn MessageHandlers>) -> anyhow::Result<()> {
            handlers.start_handler(&InboundMessage::new(1, "/start")).await;
            Err(anyhow!("connection lost"))
        }
    }

    /// Answers from a fixed table; unknown cities fail.
    #[derive(Debug, Default)]
    struct StubProvider {
        cities: HashMap<String, (f64, Vec<&'static str>)>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl StubProvider {
        fn with(mut self, city: &str, temp: f64, categories: Vec<&'static str>) -> Self {
            self.cities.insert(city.to_string(), (temp, categories));
            self
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current_by_name(&self, city: &str) -> anyhow::Result<CurrentWeather> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let (temp, categories) =
                self.cities.get(city).ok_or_else(|| anyhow!("404: city not found"))?;

            Ok(CurrentWeather {
                location_name: city.to_uppercase(),
                temperature: *temp,
                feels_like: *temp,
                humidity_pct: 50,
                conditions: categories
                    .iter()
                    .map(|c| Condition { category: c.to_string(), description: c.to_lowercase() })
                    .collect(),
                observed_at: Utc::now(),
            })
        }
    }

    fn adapter(provider: StubProvider) -> (Adapter, Arc<RecordingTransport>, Arc<StubProvider>) {
        let transport = Arc::new(RecordingTransport::default());
        let provider = Arc::new(provider);
        let adapter = Adapter::from_parts(transport.clone(), provider.clone());
        (adapter, transport, provider)
    }

    #[test]
    fn format_report_rounds_to_two_places() {
        assert_eq!(format_report("Minsk", 3.0, ""), "В городе Minsk 3.00 С° ");
        assert_eq!(format_report("Minsk", -5.678, "❄"), "В городе Minsk -5.68 С° ❄");
    }

    #[test]
    fn degree_sign_uses_cyrillic_es() {
        let report = format_report("Paris", 0.0, "");
        assert!(report.contains("\u{0421}\u{00B0}"));
    }

    #[tokio::test]
    async fn weather_handler_sends_report_for_known_city() {
        let (adapter, transport, _) = adapter(StubProvider::default().with("Paris", 21.5, vec!["Clear"]));

        adapter.weather_handler(&InboundMessage::new(42, "Paris")).await;

        assert_eq!(transport.sent(), vec![(42, "В городе Paris 21.50 С° ☀".to_string())]);
    }

    #[tokio::test]
    async fn weather_handler_uses_first_condition_only() {
        let (adapter, transport, _) =
            adapter(StubProvider::default().with("London", 12.0, vec!["Rain", "Clear"]));

        adapter.weather_handler(&InboundMessage::new(7, "London")).await;

        assert_eq!(transport.sent(), vec![(7, "В городе London 12.00 С° ☁☔".to_string())]);
    }

    #[tokio::test]
    async fn weather_handler_leaves_trailing_space_without_conditions() {
        let (adapter, transport, _) = adapter(StubProvider::default().with("Oslo", -1.0, vec![]));

        adapter.weather_handler(&InboundMessage::new(3, "Oslo")).await;

        assert_eq!(transport.sent(), vec![(3, "В городе Oslo -1.00 С° ".to_string())]);
    }

    #[tokio::test]
    async fn weather_handler_leaves_trailing_space_for_unknown_category() {
        let (adapter, transport, _) = adapter(StubProvider::default().with("Lima", 18.25, vec!["Mist"]));

        adapter.weather_handler(&InboundMessage::new(3, "Lima")).await;

        assert_eq!(transport.sent(), vec![(3, "В городе Lima 18.25 С° ".to_string())]);
    }

    #[tokio::test]
    async fn weather_handler_echoes_raw_input() {
        let (adapter, transport, _) = adapter(StubProvider::default().with(" paris ", 21.5, vec!["Clear"]));

        adapter.weather_handler(&InboundMessage::new(1, " paris ")).await;

        assert_eq!(transport.sent(), vec![(1, "В городе  paris  21.50 С° ☀".to_string())]);
    }

    #[tokio::test]
    async fn weather_handler_reports_unknown_city_once() {
        let (adapter, transport, provider) = adapter(StubProvider::default());

        adapter.weather_handler(&InboundMessage::new(9, "Atlantis")).await;

        assert_eq!(transport.sent(), vec![(9, CITY_NOT_FOUND_TEXT.to_string())]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_handler_never_queries_weather() {
        let (adapter, transport, provider) = adapter(StubProvider::default().with("Paris", 21.5, vec!["Clear"]));

        for text in ["/start", "Paris", ""] {
            adapter.start_handler(&InboundMessage::new(5, text)).await;
        }

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(chat, text)| *chat == 5 && text == START_TEXT));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn send_failures_are_absorbed() {
        let transport = Arc::new(RecordingTransport { fail_sends: true, ..Default::default() });
        let adapter = Adapter::from_parts(transport.clone(), Arc::new(StubProvider::default()));

        adapter.start_handler(&InboundMessage::new(1, "/start")).await;
        adapter.weather_handler(&InboundMessage::new(1, "Nowhere")).await;

        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn start_propagates_transport_error() {
        let (adapter, transport, _) = adapter(StubProvider::default());

        let err = Arc::new(adapter).start().await.unwrap_err();

        assert!(matches!(err, BotError::Transport(_)));
        assert!(err.to_string().contains("connection lost"));
        assert_eq!(transport.sent(), vec![(1, START_TEXT.to_string())]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_do_not_interfere() {
        let provider = StubProvider {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        }
        .with("Paris", 21.5, vec!["Clear"])
        .with("Moscow", -5.678, vec!["Snow"])
        .with("Bergen", 9.0, vec!["Drizzle"]);
        let (adapter, transport, _) = adapter(provider);
        let adapter = Arc::new(adapter);

        let tasks: Vec<_> = [(1, "Paris"), (2, "Moscow"), (3, "Bergen"), (4, "Atlantis")]
            .into_iter()
            .map(|(chat, city)| {
                let adapter = Arc::clone(&adapter);
                tokio::spawn(async move {
                    adapter.weather_handler(&InboundMessage::new(chat, city)).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut sent = transport.sent();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                (1, "В городе Paris 21.50 С° ☀".to_string()),
                (2, "В городе Moscow -5.68 С° ❄".to_string()),
                (3, "В городе Bergen 9.00 С° ☔".to_string()),
                (4, CITY_NOT_FOUND_TEXT.to_string()),
            ]
        );
    }

    #[test]
    fn new_rejects_malformed_weather_key() {
        let err = Adapter::new("123456:TOKEN", "not-a-key").err().expect("construction fails");
        assert!(matches!(err, BotError::Configuration(_)));
    }

    #[test]
    fn new_accepts_well_formed_keys() {
        assert!(Adapter::new("123456:TOKEN", "0123456789abcdef0123456789abcdef").is_ok());
    }
}
