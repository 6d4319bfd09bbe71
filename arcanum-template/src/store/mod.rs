//! Local key-value persistence.
//!
//! Each concern (snapshots, colors, gradients, prompt bundles) lives under
//! its own key as a JSON array. A corrupt or missing entry loads as an
//! empty list; it never prevents startup.

pub mod palette;
pub mod prompt_bundle;
pub mod snapshot;

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::error::TemplateResult;

pub use palette::{ColorStore, GradientKind, GradientStore, NamedColor, NamedGradient};
pub use prompt_bundle::{PromptBundle, PromptBundleStore};
pub use snapshot::{Snapshot, SnapshotStore};

pub const TEMPLATES_KEY: &str = "blogspot-templates";
pub const COLORS_KEY: &str = "blogspot-colors";
pub const GRADIENTS_KEY: &str = "blogspot-gradients";
pub const PROMPT_BUNDLES_KEY: &str = "savedPromptTemplates";

/// Text key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> TemplateResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> TemplateResult<()>;
    fn remove(&self, key: &str) -> TemplateResult<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> TemplateResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TemplateResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> TemplateResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> TemplateResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with one raw entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries().insert(key.to_string(), value.to_string());
        store
    }

    /// A panic in another holder leaves the map itself intact
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TemplateResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TemplateResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TemplateResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// A JSON array of `T` stored under one key
pub struct PersistedList<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<T>,
}

impl<T> PersistedList<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Deserialize the stored list. Absent, unreadable or malformed data
    /// yields an empty list.
    pub fn load(&self) -> Vec<T> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to read stored list");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to parse stored list, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and store the whole list
    pub fn save(&self, items: &[T]) -> TemplateResult<()> {
        let json = serde_json::to_string(items)?;
        self.store.set(self.key, &json)
    }
}

/// Current time at millisecond precision
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Time-based id: epoch milliseconds as text, bumped past any taken id
pub fn fresh_id<'a>(at: DateTime<Utc>, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();
    let mut candidate = at.timestamp_millis();
    while taken.contains(&candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Serialize dates as `2024-05-01T10:00:00.000Z`
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        n: u32,
    }

    #[test]
    fn test_memory_store_survives_poisoned_lock() {
        let store = Arc::new(MemoryStore::with_entry("k", "v"));
        let holder = store.clone();
        let result = std::thread::spawn(move || {
            let _guard = holder.entries.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(result.is_err());
        assert!(store.entries.is_poisoned());

        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.set("k", "w").unwrap();
        store.remove("missing").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn test_memory_roundtrip_and_absent_key() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let list: PersistedList<Item> = PersistedList::new(store.clone(), "items");
        assert!(list.load().is_empty());
        list.save(&[Item { n: 1 }, Item { n: 2 }]).unwrap();
        assert_eq!(list.load(), vec![Item { n: 1 }, Item { n: 2 }]);
        assert_eq!(store.get("items").unwrap().unwrap(), r#"[{"n":1},{"n":2}]"#);
    }

    #[test]
    fn test_malformed_json_loads_empty() {
        let store = Arc::new(MemoryStore::with_entry("items", "{not json"));
        let list: PersistedList<Item> = PersistedList::new(store, "items");
        assert!(list.load().is_empty());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(store.get("blogspot-colors").unwrap(), None);
        store.set("blogspot-colors", "[]").unwrap();
        assert_eq!(store.get("blogspot-colors").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("data/blogspot-colors.json").exists());
        store.remove("blogspot-colors").unwrap();
        store.remove("blogspot-colors").unwrap();
        assert_eq!(store.get("blogspot-colors").unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_fresh_id_bumps_on_collision() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(fresh_id(at, []), "1700000000000");
        assert_eq!(
            fresh_id(at, ["1700000000000", "1700000000001"]),
            "1700000000002"
        );
    }

    #[test]
    fn test_iso_millis_format() {
        #[derive(Serialize, Deserialize)]
        struct Dated {
            #[serde(with = "iso_millis")]
            at: DateTime<Utc>,
        }
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_string(&Dated { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T10:00:00.000Z"}"#);
        let back: Dated = serde_json::from_str(r#"{"at":"2024-05-01T12:00:00+02:00"}"#).unwrap();
        assert_eq!(back.at, at);
    }
}
