//! Persistent subscriber set.
//!
//! The whole set is rewritten on every mutation (JSON list of chat ids). This is
//! fine for a few thousand subscribers; beyond that an incremental store would
//! be needed.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::{domain::ChatId, Result};

pub struct SubscriberStore {
    path: PathBuf,
    members: Mutex<BTreeSet<ChatId>>,
}

impl SubscriberStore {
    /// Load the persisted set. A missing (or blank) file means no subscribers.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let members = match tokio::fs::read_to_string(&path).await {
            Ok(txt) if txt.trim().is_empty() => BTreeSet::new(),
            Ok(txt) => serde_json::from_str::<Vec<ChatId>>(&txt)?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            members: Mutex::new(members),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `id` and persist. Returns `true` if it was not present before.
    pub async fn add(&self, id: ChatId) -> Result<bool> {
        let mut guard = self.members.lock().await;
        let mut next = guard.clone();
        let inserted = next.insert(id);
        persist(&self.path, &next).await?;
        *guard = next;
        Ok(inserted)
    }

    /// Remove `id` and persist. Removing an absent id is not an error.
    /// Returns `true` if it was present.
    pub async fn remove(&self, id: ChatId) -> Result<bool> {
        let mut guard = self.members.lock().await;
        let mut next = guard.clone();
        let removed = next.remove(&id);
        persist(&self.path, &next).await?;
        *guard = next;
        Ok(removed)
    }

    /// Snapshot of current members, in ascending id order.
    pub async fn all(&self) -> Vec<ChatId> {
        self.members.lock().await.iter().copied().collect()
    }

    pub async fn contains(&self, id: ChatId) -> bool {
        self.members.lock().await.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }
}

// Write-then-rename so a crash never leaves a truncated list behind.
async fn persist(path: &Path, members: &BTreeSet<ChatId>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let txt = serde_json::to_string(&members.iter().collect::<Vec<_>>())?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, txt).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
