use std::sync::Arc;

use async_trait::async_trait;

use crate::model::InboundMessage;

pub mod telegram;

/// Callbacks the transport routes inbound messages to.
#[async_trait]
pub trait MessageHandlers: Send + Sync {
    /// The initiating command, `/start` on Telegram.
    async fn start_handler(&self, message: &InboundMessage);

    /// Any other text message.
    async fn weather_handler(&self, message: &InboundMessage);
}

/// A messaging backend: sends replies and owns the receive loop.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    /// Blocks until the loop stops.
    async fn listen_and_serve(&self, handlers: Arc<dyn MessageHandlers>) -> anyhow::Result<()>;
}
