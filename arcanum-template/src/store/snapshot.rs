use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{fresh_id, now_millis, KeyValueStore, PersistedList, TEMPLATES_KEY};
use crate::error::{TemplateError, TemplateResult};
use crate::validator::require;

/// A named, immutable copy of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(with = "super::iso_millis")]
    pub date: DateTime<Utc>,
}

/// Saved templates, in save order
pub struct SnapshotStore {
    list: PersistedList<Snapshot>,
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    /// Load persisted snapshots; corrupt data starts an empty store
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let list = PersistedList::new(store, TEMPLATES_KEY);
        let snapshots = list.load();
        Self { list, snapshots }
    }

    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, id: &str) -> TemplateResult<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Append a snapshot of `code` and persist the whole list
    pub fn save(&mut self, name: &str, code: &str) -> TemplateResult<Snapshot> {
        require("name", name)?;
        let date = now_millis();
        let id = fresh_id(date, self.snapshots.iter().map(|s| s.id.as_str()));
        let snapshot = Snapshot {
            id,
            name: name.trim().to_string(),
            code: code.to_string(),
            date,
        };

        self.snapshots.push(snapshot.clone());
        if let Err(e) = self.list.save(&self.snapshots) {
            self.snapshots.pop();
            return Err(e);
        }
        info!(id = %snapshot.id, name = %snapshot.name, "template saved");
        Ok(snapshot)
    }

    /// Remove exactly one snapshot and persist the rest in their order
    pub fn delete(&mut self, id: &str) -> TemplateResult<Snapshot> {
        let idx = self
            .snapshots
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = self.snapshots.remove(idx);
        if let Err(e) = self.list.save(&self.snapshots) {
            self.snapshots.insert(idx, removed);
            return Err(e);
        }
        info!(id = %removed.id, "template deleted");
        Ok(removed)
    }
}

fn not_found(id: &str) -> TemplateError {
    TemplateError::NotFound {
        kind: "Template",
        id: id.to_string(),
    }
}
