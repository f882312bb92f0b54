//! Document Store - JSON documents on local disk
//!
//! Documents are JSON objects addressed by a logical name (see
//! [`StoreConfig::resolve`]). Every operation on a document holds that
//! document's path lock from the [`LockTable`] for its whole duration, so
//! operations on the same file are serialized in arrival order.
//!
//! Two API layers are provided:
//! - `try_*` methods return a [`StoreResult`] and let callers tell an empty
//!   document apart from a failure.
//! - `read` / `write` / `delete` / `update` never fail: errors are logged
//!   and turned into `{}` or `false`.

mod atomic;
mod config;
mod error;
mod key_path;
mod lock;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error};

pub use config::{StoreConfig, DEFAULT_DATA_DIR, ROOT_MARKER};
pub use error::{StoreError, StoreResult};
pub use key_path::remove_key;
pub use lock::{LockTable, PathGuard};

/// A stored document: always a JSON object at the root
pub type Document = Map<String, Value>;

/// Data accepted by [`DocumentStore::write`]
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// An already-parsed JSON value; must be an object
    Value(Value),
    /// Serialized JSON text; must parse to an object
    Json(String),
}

impl DocumentInput {
    /// Validate the input and turn it into a document
    pub fn into_document(self) -> StoreResult<Document> {
        let value = match self {
            DocumentInput::Value(value) => value,
            DocumentInput::Json(text) => {
                serde_json::from_str(&text).map_err(StoreError::InvalidInput)?
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::NotAnObject(value_kind(&other))),
        }
    }
}

impl From<Value> for DocumentInput {
    fn from(value: Value) -> Self {
        DocumentInput::Value(value)
    }
}

impl From<Document> for DocumentInput {
    fn from(doc: Document) -> Self {
        DocumentInput::Value(Value::Object(doc))
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        DocumentInput::Json(text)
    }
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        DocumentInput::Json(text.to_string())
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Concurrency-safe CRUD over JSON documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    config: StoreConfig,
    locks: Arc<LockTable>,
}

impl DocumentStore {
    /// Create a store with its own lock table
    pub fn new(config: StoreConfig) -> Self {
        Self::with_locks(config, Arc::new(LockTable::new()))
    }

    /// Create a store sharing an existing lock table
    pub fn with_locks(config: StoreConfig, locks: Arc<LockTable>) -> Self {
        Self { config, locks }
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the lock table
    pub fn locks(&self) -> &Arc<LockTable> {
        &self.locks
    }

    /// Physical path of a logical name
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.config.resolve(name)
    }

    /// Whether the document's file is present on disk
    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.resolve(name)).await.unwrap_or(false)
    }

    /// Read a document, creating it as `{}` if it does not exist yet
    pub async fn try_read(&self, name: &str) -> StoreResult<Document> {
        let path = self.resolve(name);
        let _guard = self.locks.acquire(&path).await;

        match load_document(&path).await? {
            Some(doc) => Ok(doc),
            None => {
                let doc = Document::new();
                store_document(&path, &doc).await?;
                debug!(target: "db", "Created empty document {}", path.display());
                Ok(doc)
            }
        }
    }

    /// Replace a document with `data` (a JSON object or JSON text)
    pub async fn try_write(&self, name: &str, data: impl Into<DocumentInput>) -> StoreResult<()> {
        let doc = data.into().into_document()?;
        let path = self.resolve(name);
        let _guard = self.locks.acquire(&path).await;

        store_document(&path, &doc).await
    }

    /// Remove the nested property `key_path` and return its old value
    pub async fn try_delete(&self, name: &str, key_path: &str) -> StoreResult<Value> {
        let path = self.resolve(name);
        let _guard = self.locks.acquire(&path).await;

        let mut doc = load_document(&path).await?.unwrap_or_default();
        let removed = remove_key(&mut doc, key_path)?;
        store_document(&path, &doc).await?;
        Ok(removed)
    }

    /// Read-modify-write a document under a single lock acquisition.
    ///
    /// A missing document starts out as `{}`.
    pub async fn try_update<F, R>(&self, name: &str, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Document) -> R,
    {
        let path = self.resolve(name);
        let _guard = self.locks.acquire(&path).await;

        let mut doc = load_document(&path).await?.unwrap_or_default();
        let result = f(&mut doc);
        store_document(&path, &doc).await?;
        Ok(result)
    }

    /// Best-effort read: returns `{}` on any failure
    pub async fn read(&self, name: &str) -> Document {
        self.try_read(name).await.unwrap_or_else(|e| {
            error!(target: "db", "Error reading file {}: {}", name, e);
            Document::new()
        })
    }

    /// Best-effort write: returns whether the document was stored
    pub async fn write(&self, name: &str, data: impl Into<DocumentInput>) -> bool {
        match self.try_write(name, data).await {
            Ok(()) => true,
            Err(e) if e.is_invalid_input() => {
                error!(target: "db", "Invalid data for {}: {}", name, e);
                false
            }
            Err(e) => {
                error!(target: "db", "Error writing to file {}: {}", name, e);
                false
            }
        }
    }

    /// Best-effort delete: returns whether the key was found and removed
    pub async fn delete(&self, name: &str, key_path: &str) -> bool {
        match self.try_delete(name, key_path).await {
            Ok(_) => true,
            Err(e) => {
                error!(target: "db", "Error deleting key {} from file {}: {}", key_path, name, e);
                false
            }
        }
    }

    /// Best-effort update: returns whether the document was stored
    pub async fn update<F>(&self, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Document),
    {
        match self.try_update(name, f).await {
            Ok(()) => true,
            Err(e) => {
                error!(target: "db", "Error updating file {}: {}", name, e);
                false
            }
        }
    }
}

/// Load and parse a document; `None` if the file does not exist.
/// Caller must hold the path lock.
async fn load_document(path: &Path) -> StoreResult<Option<Document>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(StoreError::NotAnObject(value_kind(&other))),
    }
}

/// Serialize a document with 2-space indentation and replace the file.
/// Caller must hold the path lock.
async fn store_document(path: &Path, doc: &Document) -> StoreResult<()> {
    let content = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::json(path, e))?;
    atomic::atomic_write(path, &content)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (DocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(StoreConfig::new(temp_dir.path()));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_read_missing_creates_empty_document() {
        let (store, _temp) = create_test_store();

        let doc = store.read("fresh").await;
        assert!(doc.is_empty());

        let content = std::fs::read_to_string(store.resolve("fresh")).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&content).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_write_is_pretty_printed() {
        let (store, _temp) = create_test_store();

        assert!(store.write("pretty", json!({"a": {"b": 1}})).await);

        let content = std::fs::read_to_string(store.resolve("pretty")).unwrap();
        assert_eq!(content, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    }

    #[tokio::test]
    async fn test_write_accepts_json_text() {
        let (store, _temp) = create_test_store();

        assert!(store.write("text", r#"{"k": [1, 2]}"#).await);
        assert_eq!(Value::Object(store.read("text").await), json!({"k": [1, 2]}));
    }

    #[tokio::test]
    async fn test_write_rejects_non_objects() {
        let (store, _temp) = create_test_store();

        assert!(!store.write("bad", json!([1, 2, 3])).await);
        assert!(!store.write("bad", Value::Null).await);
        assert!(!store.write("bad", "42").await);
        assert!(!store.exists("bad").await);

        let err = store.try_write("bad", json!("str")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject("string")));
    }

    #[tokio::test]
    async fn test_malformed_text_leaves_file_untouched() {
        let (store, _temp) = create_test_store();
        store.write("keep", json!({"v": 1})).await;

        let err = store.try_write("keep", "not json{").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert_eq!(Value::Object(store.read("keep").await), json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let (store, _temp) = create_test_store();
        let path = store.resolve("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(
            store.try_read("corrupt").await,
            Err(StoreError::Json { .. })
        ));
        assert!(store.read("corrupt").await.is_empty());
        // The corrupt file is not overwritten by a failed read
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ nope");
    }

    #[tokio::test]
    async fn test_array_file_is_not_a_document() {
        let (store, _temp) = create_test_store();
        let path = store.resolve("list");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            store.try_read("list").await,
            Err(StoreError::NotAnObject("array"))
        ));
    }

    #[tokio::test]
    async fn test_delete_nested_key() {
        let (store, _temp) = create_test_store();
        store.write("doc", json!({"a": {"b": 1, "c": 2}})).await;

        assert!(store.delete("doc", "a.b").await);
        assert_eq!(Value::Object(store.read("doc").await), json!({"a": {"c": 2}}));
    }

    #[tokio::test]
    async fn test_delete_missing_path_is_noop() {
        let (store, _temp) = create_test_store();
        store.write("doc", json!({"a": {"b": 1}})).await;

        assert!(!store.delete("doc", "x.y").await);
        assert!(!store.delete("doc", "a.missing").await);
        assert_eq!(Value::Object(store.read("doc").await), json!({"a": {"b": 1}}));
    }

    #[tokio::test]
    async fn test_delete_on_missing_file_does_not_create_it() {
        let (store, _temp) = create_test_store();

        assert!(!store.delete("ghost", "a").await);
        assert!(!store.exists("ghost").await);
    }

    #[tokio::test]
    async fn test_try_delete_returns_removed_value() {
        let (store, _temp) = create_test_store();
        store.write("doc", json!({"a": {"b": [1, 2]}})).await;

        let removed = store.try_delete("doc", "a.b").await.unwrap();
        assert_eq!(removed, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_update_starts_from_empty() {
        let (store, _temp) = create_test_store();

        let len = store
            .try_update("counter", |doc| {
                doc.insert("n".to_string(), json!(1));
                doc.len()
            })
            .await
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(Value::Object(store.read("counter").await), json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_lock_released_after_failure() {
        let (store, _temp) = create_test_store();

        assert!(!store.delete("doc", "nope").await);
        assert!(!store.locks().is_locked(&store.resolve("doc")));
        assert!(store.write("doc", json!({"ok": true})).await);
    }

    #[tokio::test]
    async fn test_io_failure_reports_false_and_releases_lock() {
        let (store, _temp) = create_test_store();
        let data_dir = store.config().data_dir();
        std::fs::create_dir_all(&data_dir).unwrap();
        // A plain file where a directory is expected
        std::fs::write(data_dir.join("blocked"), "not a directory").unwrap();

        assert!(!store.write("blocked/doc", json!({"a": 1})).await);
        assert!(!store.delete("blocked/doc", "a").await);
        assert!(store.read("blocked/doc").await.is_empty());

        let err = store.try_write("blocked/doc", json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!err.is_invalid_input());
        assert!(matches!(
            store.try_delete("blocked/doc", "a").await,
            Err(StoreError::Io { .. })
        ));

        assert!(!store.locks().is_locked(&store.resolve("blocked/doc")));
    }

    #[tokio::test]
    async fn test_rewrite_keeps_key_order() {
        let (store, _temp) = create_test_store();
        store
            .write("ordered", r#"{"zeta": 1, "beta": 0, "alpha": 2, "mid": 3}"#)
            .await;

        assert!(store.delete("ordered", "beta").await);

        let content = std::fs::read_to_string(store.resolve("ordered")).unwrap();
        assert_eq!(content, "{\n  \"zeta\": 1,\n  \"alpha\": 2,\n  \"mid\": 3\n}");
    }

    #[tokio::test]
    async fn test_shared_lock_table() {
        let temp_dir = TempDir::new().unwrap();
        let locks = Arc::new(LockTable::new());
        let a = DocumentStore::with_locks(StoreConfig::new(temp_dir.path()), locks.clone());
        let b = DocumentStore::with_locks(StoreConfig::new(temp_dir.path()), locks.clone());

        a.write("x", json!({})).await;
        b.write("x", json!({})).await;
        assert_eq!(locks.len(), 1);
    }
}
