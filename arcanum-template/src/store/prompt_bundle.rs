use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{fresh_id, now_millis, KeyValueStore, PersistedList, PROMPT_BUNDLES_KEY};
use crate::error::{TemplateError, TemplateResult};
use crate::validator::require;

/// A named set of form options for the content-prompt generator.
///
/// `options` is opaque: whatever keys the form defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBundle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(rename = "createdAt", with = "super::iso_millis")]
    pub created_at: DateTime<Utc>,
}

pub struct PromptBundleStore {
    list: PersistedList<PromptBundle>,
    bundles: Vec<PromptBundle>,
}

impl PromptBundleStore {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let list = PersistedList::new(store, PROMPT_BUNDLES_KEY);
        let bundles = list.load();
        Self { list, bundles }
    }

    pub fn list(&self) -> &[PromptBundle] {
        &self.bundles
    }

    pub fn save(&mut self, name: &str, options: Map<String, Value>) -> TemplateResult<PromptBundle> {
        require("name", name)?;
        let created_at = now_millis();
        let bundle = PromptBundle {
            id: fresh_id(created_at, self.bundles.iter().map(|b| b.id.as_str())),
            name: name.trim().to_string(),
            options,
            created_at,
        };
        self.bundles.push(bundle.clone());
        if let Err(e) = self.list.save(&self.bundles) {
            self.bundles.pop();
            return Err(e);
        }
        Ok(bundle)
    }

    pub fn delete(&mut self, id: &str) -> TemplateResult<PromptBundle> {
        let idx = self
            .bundles
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| TemplateError::NotFound {
                kind: "Prompt bundle",
                id: id.to_string(),
            })?;
        let removed = self.bundles.remove(idx);
        if let Err(e) = self.list.save(&self.bundles) {
            self.bundles.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_options_are_kept_verbatim() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = PromptBundleStore::open(kv.clone());
        let options = json!({
            "keyword": "cristales curativos",
            "tone": "místico",
            "sections": ["faq", "testimonios"],
            "wordCount": 1200
        });
        let Value::Object(options) = options else { unreachable!() };
        let saved = store.save("Cristales", options.clone()).unwrap();

        let reopened = PromptBundleStore::open(kv);
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].options, options);
        assert_eq!(reopened.list()[0].id, saved.id);
    }

    #[test]
    fn test_delete_unknown_bundle() {
        let mut store = PromptBundleStore::open(Arc::new(MemoryStore::new()));
        assert!(matches!(store.delete("nope"), Err(TemplateError::NotFound { .. })));
    }
}
