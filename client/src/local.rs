//! Per-origin key-value storage kept in a JSON file.
//!
//! Values are strings, the way a browser's local storage keeps them. Every
//! update is a read-modify-write done under one async lock and persisted by
//! writing a temporary file and renaming it over the original.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use kernel::{LocalEntry, LOCAL_STORE_KEY};
use tokio::sync::Mutex;

use crate::error::ClientError;

type Items = BTreeMap<String, String>;

#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items().await?;
        Ok(items.remove(key))
    }

    pub async fn set_item(&self, key: &str, value: String) -> Result<(), ClientError> {
        self.update(key, |_| Ok((Some(value), ()))).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.update(key, |_| Ok((None, ()))).await
    }

    /// Atomically replaces the value under `key` with what `change` returns.
    ///
    /// `None` from `change` removes the key. Nothing is written when
    /// `change` fails.
    pub async fn update<F, R>(&self, key: &str, change: F) -> Result<R, ClientError>
    where
        F: FnOnce(Option<String>) -> Result<(Option<String>, R), ClientError>,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items().await?;
        let (value, result) = change(items.remove(key))?;
        if let Some(value) = value {
            items.insert(key.to_owned(), value);
        }
        self.write_items(&items).await?;
        Ok(result)
    }

    async fn read_items(&self) -> Result<Items, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.is_empty() => Ok(Items::new()),
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_items(&self, items: &Items) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec(items)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Reads the list kept under `uploadedImages`.
pub async fn load_entries(storage: &LocalStorage) -> Result<Vec<LocalEntry>, ClientError> {
    let value = storage.get_item(LOCAL_STORE_KEY).await?;
    decode(value)
}

/// Appends to the list kept under `uploadedImages` and returns the new length.
pub async fn append_entry(storage: &LocalStorage, entry: LocalEntry) -> Result<usize, ClientError> {
    storage
        .update(LOCAL_STORE_KEY, move |value| {
            let mut entries = decode(value)?;
            entries.push(entry);
            let len = entries.len();
            Ok((Some(serde_json::to_string(&entries)?), len))
        })
        .await
}

/// Splices the entry at `index` out of the list kept under `uploadedImages`.
pub async fn remove_entry(storage: &LocalStorage, index: usize) -> Result<LocalEntry, ClientError> {
    storage
        .update(LOCAL_STORE_KEY, move |value| {
            let mut entries = decode(value)?;
            if index >= entries.len() {
                return Err(ClientError::NotFound(index));
            }
            let removed = entries.remove(index);
            Ok((Some(serde_json::to_string(&entries)?), removed))
        })
        .await
}

fn decode(value: Option<String>) -> Result<Vec<LocalEntry>, ClientError> {
    match value {
        Some(json) => Ok(serde_json::from_str::<Option<Vec<LocalEntry>>>(&json)?.unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}
