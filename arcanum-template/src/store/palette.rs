use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::{fresh_id, now_millis, KeyValueStore, PersistedList, COLORS_KEY, GRADIENTS_KEY};
use crate::error::{TemplateError, TemplateResult};
use crate::validator::{require, validate_gradient, validate_hex_color};

/// A saved `#rrggbb` color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColor {
    pub id: String,
    pub name: String,
    pub value: String,
    #[serde(rename = "createdAt", with = "super::iso_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

impl FromStr for GradientKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(GradientKind::Linear),
            "radial" => Ok(GradientKind::Radial),
            other => Err(format!("unknown gradient type '{}': expected linear or radial", other)),
        }
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientKind::Linear => f.write_str("linear"),
            GradientKind::Radial => f.write_str("radial"),
        }
    }
}

/// A saved multi-stop gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedGradient {
    pub id: String,
    pub name: String,
    pub colors: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: GradientKind,
    #[serde(default)]
    pub angle: f64,
    #[serde(rename = "createdAt", with = "super::iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl NamedGradient {
    /// CSS `background` value. Radial gradients ignore the angle.
    pub fn css_value(&self) -> String {
        let stops = self.colors.join(", ");
        match self.kind {
            GradientKind::Linear => format!("linear-gradient({}deg, {})", self.angle, stops),
            GradientKind::Radial => format!("radial-gradient(circle, {})", stops),
        }
    }
}

/// Saved colors, in creation order
pub struct ColorStore {
    list: PersistedList<NamedColor>,
    colors: Vec<NamedColor>,
}

impl ColorStore {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let list = PersistedList::new(store, COLORS_KEY);
        let colors = list.load();
        Self { list, colors }
    }

    pub fn list(&self) -> &[NamedColor] {
        &self.colors
    }

    pub fn get(&self, id: &str) -> TemplateResult<&NamedColor> {
        self.colors
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Color", id))
    }

    pub fn create(&mut self, name: &str, value: &str) -> TemplateResult<NamedColor> {
        require("name", name)?;
        validate_hex_color(value)?;
        let created_at = now_millis();
        let color = NamedColor {
            id: fresh_id(created_at, self.colors.iter().map(|c| c.id.as_str())),
            name: name.trim().to_string(),
            value: value.to_lowercase(),
            created_at,
        };
        self.colors.push(color.clone());
        if let Err(e) = self.list.save(&self.colors) {
            self.colors.pop();
            return Err(e);
        }
        Ok(color)
    }

    pub fn delete(&mut self, id: &str) -> TemplateResult<NamedColor> {
        let idx = self
            .colors
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found("Color", id))?;
        let removed = self.colors.remove(idx);
        if let Err(e) = self.list.save(&self.colors) {
            self.colors.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }
}

/// Saved gradients, in creation order
pub struct GradientStore {
    list: PersistedList<NamedGradient>,
    gradients: Vec<NamedGradient>,
}

impl GradientStore {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let list = PersistedList::new(store, GRADIENTS_KEY);
        let gradients = list.load();
        Self { list, gradients }
    }

    pub fn list(&self) -> &[NamedGradient] {
        &self.gradients
    }

    pub fn get(&self, id: &str) -> TemplateResult<&NamedGradient> {
        self.gradients
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("Gradient", id))
    }

    pub fn create(
        &mut self,
        name: &str,
        colors: Vec<String>,
        kind: GradientKind,
        angle: f64,
    ) -> TemplateResult<NamedGradient> {
        require("name", name)?;
        validate_gradient(&colors, angle)?;
        let created_at = now_millis();
        let gradient = NamedGradient {
            id: fresh_id(created_at, self.gradients.iter().map(|g| g.id.as_str())),
            name: name.trim().to_string(),
            colors: colors.into_iter().map(|c| c.to_lowercase()).collect(),
            kind,
            angle,
            created_at,
        };
        self.gradients.push(gradient.clone());
        if let Err(e) = self.list.save(&self.gradients) {
            self.gradients.pop();
            return Err(e);
        }
        Ok(gradient)
    }

    pub fn delete(&mut self, id: &str) -> TemplateResult<NamedGradient> {
        let idx = self
            .gradients
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| not_found("Gradient", id))?;
        let removed = self.gradients.remove(idx);
        if let Err(e) = self.list.save(&self.gradients) {
            self.gradients.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }
}

fn not_found(kind: &'static str, id: &str) -> TemplateError {
    TemplateError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_malformed_colors_start_empty() {
        let kv = Arc::new(MemoryStore::with_entry(COLORS_KEY, "{not json"));
        let store = ColorStore::open(kv);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_color_create_validates_and_persists() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = ColorStore::open(kv.clone());
        assert!(matches!(
            store.create("Oro", "gold"),
            Err(TemplateError::InvalidColor { .. })
        ));
        let oro = store.create("Oro", "#C9A227").unwrap();
        assert_eq!(oro.value, "#c9a227");

        let raw = kv.get(COLORS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["name"], "Oro");
        assert!(json[0]["createdAt"].as_str().unwrap().ends_with('Z'));

        assert_eq!(ColorStore::open(kv).list(), &[oro][..]);
    }

    #[test]
    fn test_color_delete() {
        let mut store = ColorStore::open(Arc::new(MemoryStore::new()));
        let a = store.create("A", "#000000").unwrap();
        let b = store.create("B", "#ffffff").unwrap();
        store.delete(&a.id).unwrap();
        assert_eq!(store.list(), &[b][..]);
        assert!(store.get(&a.id).is_err());
    }

    #[test]
    fn test_gradient_layout_and_css() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = GradientStore::open(kv.clone());
        let aurora = store
            .create(
                "Aurora",
                vec!["#7B2CBF".to_string(), "#3C096C".to_string()],
                GradientKind::Linear,
                135.0,
            )
            .unwrap();
        assert_eq!(aurora.css_value(), "linear-gradient(135deg, #7b2cbf, #3c096c)");

        let raw = kv.get(GRADIENTS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["type"], "linear");
        assert_eq!(json[0]["angle"], 135.0);
    }

    #[test]
    fn test_radial_ignores_angle() {
        let mut store = GradientStore::open(Arc::new(MemoryStore::new()));
        let g = store
            .create(
                "Halo",
                vec!["#ffffff".to_string(), "#000000".to_string()],
                GradientKind::Radial,
                45.0,
            )
            .unwrap();
        assert_eq!(g.css_value(), "radial-gradient(circle, #ffffff, #000000)");
    }

    #[test]
    fn test_gradient_needs_two_colors() {
        let mut store = GradientStore::open(Arc::new(MemoryStore::new()));
        let err = store
            .create("Uno", vec!["#ffffff".to_string()], GradientKind::Linear, 0.0)
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidGradient { .. }));
        assert!(store.list().is_empty());
    }
}
