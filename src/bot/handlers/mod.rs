//! Event handlers
//!
//! - `ready`: announces readiness and sets presence
//! - `message_cache`: records channel messages into `cache/messages`
//! - `random_message`: occasionally posts a sample of cached messages

pub mod message_cache;
pub mod random_message;
pub mod ready;

use crate::bot::Dispatcher;
use crate::config::BotConfig;
use crate::store::DocumentStore;

pub use message_cache::MessageCacheHandler;
pub use random_message::RandomMessageHandler;
pub use ready::ReadyHandler;

/// Logical name of the message cache document
pub const MESSAGE_CACHE: &str = "cache/messages";

/// Register all handlers with the dispatcher
pub fn register_all_handlers(dispatcher: &mut Dispatcher, store: DocumentStore, config: &BotConfig) {
    dispatcher.register_handler(Box::new(ReadyHandler::new(
        config.presence.clone(),
        config.status.clone(),
    )));

    // The cache must see a message before random_message samples
    dispatcher.register_handler(Box::new(MessageCacheHandler::new(
        store.clone(),
        config.random_channel.clone(),
        config.cache_limit,
    )));
    dispatcher.register_handler(Box::new(RandomMessageHandler::new(
        store,
        config.random_channel.clone(),
        config.msg_cap,
        config.min_cached,
    )));
}
