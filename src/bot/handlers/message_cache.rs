//! Message cache handler
//!
//! Appends human messages to `cache/messages` as
//! `{"msgs": {"<channel>": [{id, author_id, content, timestamp}, ...]}}`,
//! keeping at most `limit` entries per channel (oldest dropped first).

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::MESSAGE_CACHE;
use crate::bot::{Action, BotResult, EventHandler, EventKind, GatewayEvent, IncomingMessage};
use crate::store::{Document, DocumentStore};

pub struct MessageCacheHandler {
    store: DocumentStore,
    /// Only this channel is cached; `None` caches every channel
    channel: Option<String>,
    limit: usize,
}

impl MessageCacheHandler {
    pub fn new(store: DocumentStore, channel: Option<String>, limit: usize) -> Self {
        Self {
            store,
            channel,
            limit,
        }
    }

    fn should_cache(&self, msg: &IncomingMessage) -> bool {
        if msg.author_bot || msg.content.trim().is_empty() {
            return false;
        }
        match &self.channel {
            Some(channel) => *channel == msg.channel_id,
            None => true,
        }
    }
}

/// Append `entry` to `doc.msgs[channel]`, replacing malformed containers
fn push_entry(doc: &mut Document, channel: &str, entry: Value, limit: usize) {
    let msgs = doc
        .entry("msgs")
        .or_insert_with(|| Value::Object(Map::new()));
    if !msgs.is_object() {
        *msgs = Value::Object(Map::new());
    }

    let Some(msgs) = msgs.as_object_mut() else {
        return;
    };
    let list = msgs
        .entry(channel.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !list.is_array() {
        *list = Value::Array(Vec::new());
    }

    if let Some(list) = list.as_array_mut() {
        list.push(entry);
        if list.len() > limit {
            let excess = list.len() - limit;
            list.drain(..excess);
        }
    }
}

#[async_trait]
impl EventHandler for MessageCacheHandler {
    fn name(&self) -> &str {
        "message_cache"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageCreate
    }

    async fn handle(&self, event: &GatewayEvent) -> BotResult<Vec<Action>> {
        let GatewayEvent::MessageCreate(msg) = event else {
            return Ok(Vec::new());
        };
        if !self.should_cache(msg) {
            return Ok(Vec::new());
        }

        let entry = json!({
            "id": msg.id,
            "author_id": msg.author_id,
            "content": msg.content,
            "timestamp": chrono::Utc::now().timestamp(),
        });
        let limit = self.limit;
        self.store
            .try_update(MESSAGE_CACHE, |doc| {
                push_entry(doc, &msg.channel_id, entry, limit)
            })
            .await?;

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use tempfile::TempDir;

    fn message(channel: &str, content: &str, bot: bool) -> GatewayEvent {
        GatewayEvent::MessageCreate(IncomingMessage {
            id: format!("id-{}", content),
            channel_id: channel.to_string(),
            author_id: "user".to_string(),
            author_bot: bot,
            content: content.to_string(),
            mentioned: false,
        })
    }

    fn cached(store_doc: &Document, channel: &str) -> Vec<String> {
        store_doc["msgs"][channel]
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|m| m["content"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_caches_watched_channel_only() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(StoreConfig::new(temp_dir.path()));
        let handler = MessageCacheHandler::new(store.clone(), Some("100".to_string()), 10);

        handler.handle(&message("100", "hello", false)).await.unwrap();
        handler.handle(&message("200", "elsewhere", false)).await.unwrap();
        handler.handle(&message("100", "beep", true)).await.unwrap();
        handler.handle(&message("100", "   ", false)).await.unwrap();

        let doc = store.read(MESSAGE_CACHE).await;
        assert_eq!(cached(&doc, "100"), vec!["hello"]);
        assert!(doc["msgs"].get("200").is_none());
    }

    #[tokio::test]
    async fn test_trims_to_limit() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(StoreConfig::new(temp_dir.path()));
        let handler = MessageCacheHandler::new(store.clone(), None, 2);

        for content in ["one", "two", "three"] {
            handler.handle(&message("7", content, false)).await.unwrap();
        }

        let doc = store.read(MESSAGE_CACHE).await;
        assert_eq!(cached(&doc, "7"), vec!["two", "three"]);
    }

    #[test]
    fn test_push_entry_repairs_malformed_cache() {
        let mut doc = Document::new();
        doc.insert("msgs".to_string(), json!("garbage"));

        push_entry(&mut doc, "1", json!({"content": "x"}), 5);

        assert_eq!(Value::Object(doc), json!({"msgs": {"1": [{"content": "x"}]}}));
    }
}
