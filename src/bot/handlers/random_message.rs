//! Random message handler
//!
//! Every `cap` messages in the watched channel (or immediately when the bot
//! is mentioned) the bot posts a few randomly chosen cached messages joined
//! together.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use super::MESSAGE_CACHE;
use crate::bot::{Action, BotResult, EventHandler, EventKind, GatewayEvent};
use crate::store::DocumentStore;

/// Upper bound of cached messages combined into one post
const MAX_SAMPLES: usize = 4;

pub struct RandomMessageHandler {
    store: DocumentStore,
    channel: Option<String>,
    cap: usize,
    min_cached: usize,
    counter: AtomicUsize,
}

impl RandomMessageHandler {
    pub fn new(store: DocumentStore, channel: Option<String>, cap: usize, min_cached: usize) -> Self {
        Self {
            store,
            channel,
            cap,
            min_cached,
            counter: AtomicUsize::new(0),
        }
    }

    /// Count a message; true when it is time to post
    fn tick(&self, mentioned: bool) -> bool {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if mentioned || count >= self.cap {
            self.counter.store(0, Ordering::SeqCst);
            true
        } else {
            false
        }
    }
}

/// Pick 1..=4 random non-blank contents and join them with spaces
pub fn sample_message<R: Rng + ?Sized>(rng: &mut R, contents: &[&str]) -> Option<String> {
    if contents.is_empty() {
        return None;
    }

    let count = rng.gen_range(1..=MAX_SAMPLES);
    let picked: Vec<&str> = (0..count)
        .map(|_| contents[rng.gen_range(0..contents.len())].trim())
        .filter(|c| !c.is_empty())
        .collect();

    if picked.is_empty() {
        None
    } else {
        Some(picked.join(" "))
    }
}

#[async_trait]
impl EventHandler for RandomMessageHandler {
    fn name(&self) -> &str {
        "random_message"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageCreate
    }

    fn enabled(&self) -> bool {
        self.channel.is_some()
    }

    async fn handle(&self, event: &GatewayEvent) -> BotResult<Vec<Action>> {
        let GatewayEvent::MessageCreate(msg) = event else {
            return Ok(Vec::new());
        };
        if self.channel.as_deref() != Some(msg.channel_id.as_str()) || msg.author_bot {
            return Ok(Vec::new());
        }
        if !self.tick(msg.mentioned) {
            return Ok(Vec::new());
        }

        let doc = self.store.try_read(MESSAGE_CACHE).await?;
        let contents: Vec<&str> = doc
            .get("msgs")
            .and_then(|msgs| msgs.get(&msg.channel_id))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .map(|m| m.get("content").and_then(Value::as_str).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        if contents.len() < self.min_cached && !msg.mentioned {
            debug!(
                target: "bot",
                "Only {} cached messages, need {}",
                contents.len(),
                self.min_cached
            );
            return Ok(Vec::new());
        }

        let content = sample_message(&mut rand::thread_rng(), &contents);
        Ok(content
            .map(|content| Action::SendMessage {
                channel_id: msg.channel_id.clone(),
                content,
            })
            .into_iter()
            .collect())
    }
}
