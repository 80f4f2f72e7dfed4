use thiserror::Error;

/// Errors surfaced by the bot adapter.
#[derive(Debug, Error)]
pub enum BotError {
    /// The weather provider rejected its configuration (units, language or key).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A per-message weather lookup failed. Never leaves a handler.
    #[error("weather lookup failed: {0:#}")]
    Lookup(#[source] anyhow::Error),

    /// The messaging transport's run loop failed.
    #[error("transport error: {0:#}")]
    Transport(#[source] anyhow::Error),
}

impl BotError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        BotError::Configuration(msg.into())
    }
}
