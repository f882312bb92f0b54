//! Gateway events and outgoing actions
//!
//! Both travel as one JSON object per line, tagged by `type`.

use serde::{Deserialize, Serialize};

/// Kind of a gateway event, used to route it to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Ready,
    MessageCreate,
}

/// A chat message as delivered by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_bot: bool,
    #[serde(default)]
    pub content: String,
    /// Whether the bot user was mentioned
    #[serde(default)]
    pub mentioned: bool,
}

/// Event received from the platform gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    Ready {
        #[serde(default)]
        user: Option<String>,
    },
    MessageCreate(IncomingMessage),
}

impl GatewayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GatewayEvent::Ready { .. } => EventKind::Ready,
            GatewayEvent::MessageCreate(_) => EventKind::MessageCreate,
        }
    }
}

/// Something the bot asks the platform to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetPresence { activity: String, status: String },
    SendMessage { channel_id: String, content: String },
}
