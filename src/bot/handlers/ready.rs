//! Ready handler: log readiness and set the bot's presence

use async_trait::async_trait;
use tracing::info;

use crate::bot::{Action, BotResult, EventHandler, EventKind, GatewayEvent};

pub struct ReadyHandler {
    activity: String,
    status: String,
}

impl ReadyHandler {
    pub fn new(activity: String, status: String) -> Self {
        Self { activity, status }
    }
}

#[async_trait]
impl EventHandler for ReadyHandler {
    fn name(&self) -> &str {
        "ready"
    }

    fn kind(&self) -> EventKind {
        EventKind::Ready
    }

    fn once(&self) -> bool {
        true
    }

    async fn handle(&self, event: &GatewayEvent) -> BotResult<Vec<Action>> {
        if let GatewayEvent::Ready { user } = event {
            info!(target: "bot", "Ready! (as {})", user.as_deref().unwrap_or("unknown user"));
        }

        Ok(vec![Action::SetPresence {
            activity: self.activity.clone(),
            status: self.status.clone(),
        }])
    }
}
