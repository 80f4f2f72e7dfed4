//! Telegram transport backed by a teloxide dispatcher.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::model::InboundMessage;

use super::{MessageHandlers, Transport};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Ask the bot how to use it.
    Start,
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(token: impl Into<String>) -> Self {
        Self { bot: Bot::new(token) }
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .context("Failed to send Telegram message")?;
        Ok(())
    }

    async fn listen_and_serve(&self, handlers: Arc<dyn MessageHandlers>) -> anyhow::Result<()> {
        // Surfaces a rejected token before the dispatcher starts polling.
        let me = self.bot.get_me().await.context("Failed to authenticate Telegram bot")?;
        info!(username = %me.username(), "telegram dispatcher starting");

        let handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_command),
            )
            .branch(
                dptree::filter_map(|msg: Message| msg.text().map(ToOwned::to_owned))
                    .endpoint(handle_text),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![handlers])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("telegram dispatcher stopped");
        Ok(())
    }
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    handlers: Arc<dyn MessageHandlers>,
) -> ResponseResult<()> {
    let inbound = InboundMessage::new(msg.chat.id.0, msg.text().unwrap_or_default());
    debug!(chat_id = inbound.chat_id, command = ?cmd, "telegram command received");

    match cmd {
        Command::Start => handlers.start_handler(&inbound).await,
    }
    Ok(())
}

async fn handle_text(
    msg: Message,
    text: String,
    handlers: Arc<dyn MessageHandlers>,
) -> ResponseResult<()> {
    let inbound = InboundMessage::new(msg.chat.id.0, text);
    debug!(chat_id = inbound.chat_id, "telegram text received");

    handlers.weather_handler(&inbound).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_command() {
        let cmd = Command::parse("/start", "weather_bot").expect("start parses");
        assert_eq!(cmd, Command::Start);

        let cmd = Command::parse("/start@weather_bot", "weather_bot").expect("mention parses");
        assert_eq!(cmd, Command::Start);
    }

    #[test]
    fn other_text_is_not_a_command() {
        assert!(Command::parse("Paris", "weather_bot").is_err());
        assert!(Command::parse("/help", "weather_bot").is_err());
    }

    #[test]
    fn debug_hides_token() {
        let transport = TelegramTransport::new("123456:SECRET");
        assert!(!format!("{transport:?}").contains("SECRET"));
    }
}
