//! Bot event dispatch
//!
//! The dispatcher reads gateway events as JSON lines, routes each one to
//! the handlers registered for its kind, and writes the resulting actions
//! back as JSON lines.

pub mod events;
pub mod handlers;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use crate::store::StoreError;

pub use events::{Action, EventKind, GatewayEvent, IncomingMessage};

/// Result type for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Errors raised by the dispatcher and handlers
#[derive(Error, Debug)]
pub enum BotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Trait for event handlers
///
/// Handlers are registered with the [`Dispatcher`] at startup and receive
/// every event of their [`kind`](EventHandler::kind).
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Unique handler name
    fn name(&self) -> &str;

    /// Event kind this handler reacts to
    fn kind(&self) -> EventKind;

    /// Handle at most one event over the process lifetime
    fn once(&self) -> bool {
        false
    }

    /// Disabled handlers are registered but never invoked
    fn enabled(&self) -> bool {
        true
    }

    /// Handle an event, returning actions for the platform
    async fn handle(&self, event: &GatewayEvent) -> BotResult<Vec<Action>>;
}

/// Routes gateway events to registered handlers
pub struct Dispatcher {
    handlers: Vec<Box<dyn EventHandler>>,
    fired: HashSet<String>,
}

impl Dispatcher {
    /// Create a dispatcher with no handlers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            fired: HashSet::new(),
        }
    }

    /// Register a handler; handlers run in registration order
    pub fn register_handler(&mut self, handler: Box<dyn EventHandler>) -> &mut Self {
        debug!(target: "bot", "Registered handler {}", handler.name());
        self.handlers.push(handler);
        self
    }

    /// Get the number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Names of registered handlers, in order
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run every matching handler for one event.
    ///
    /// Handler failures are logged and do not stop the remaining handlers.
    pub async fn dispatch(&mut self, event: &GatewayEvent) -> Vec<Action> {
        let kind = event.kind();
        let mut actions = Vec::new();

        for handler in &self.handlers {
            if handler.kind() != kind || !handler.enabled() {
                continue;
            }
            if handler.once() && self.fired.contains(handler.name()) {
                continue;
            }

            match handler.handle(event).await {
                Ok(mut produced) => actions.append(&mut produced),
                Err(e) => error!(target: "bot", "Handler {} failed: {}", handler.name(), e),
            }

            if handler.once() {
                self.fired.insert(handler.name().to_string());
            }
        }

        actions
    }

    /// Process JSON-line events from `reader` until EOF
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> BotResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let event: GatewayEvent = match serde_json::from_str(trimmed) {
                Ok(event) => event,
                Err(e) => {
                    warn!(target: "bot", "Ignoring malformed event: {}", e);
                    continue;
                }
            };

            for action in self.dispatch(&event).await {
                let json = serde_json::to_string(&action)?;
                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            writer.flush().await?;
        }
        Ok(())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
