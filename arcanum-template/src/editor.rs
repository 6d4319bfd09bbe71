//! The editing session: one template document, mutated in place.
//!
//! Every operation follows the same cycle: read the current document,
//! compute the next one, store it, re-render the preview.

use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

use crate::css::{color_rule, font_rule, gradient_rule};
use crate::error::{TemplateError, TemplateResult};
use crate::font::{google_fonts_link, FontFamily};
use crate::meta::{build_meta_block, MetaTag};
use crate::preview::{DeviceWidth, PreviewRenderer};
use crate::splice::{try_insert_fragment, Marker, MissingMarkerPolicy};
use crate::starter::BASIC_TEMPLATE;
use crate::store::{NamedColor, NamedGradient, Snapshot, SnapshotStore};
use crate::tag::build_tag_fragment;
use crate::validator::{
    require, validate_attribute_name, validate_hex_color, validate_selector, validate_tag_name,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// Short user-facing message about the outcome of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == NoticeLevel::Warning
    }

    /// Keep the more severe of two notices
    fn worst(self, other: Notice) -> Notice {
        if other.is_warning() && !self.is_warning() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Warning => "⚠",
        };
        write!(f, "{} {}", icon, self.message)
    }
}

/// Asks the user before a destructive action
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything (`--yes`)
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorOptions {
    pub missing_marker: MissingMarkerPolicy,
    /// Skip fragments that were already inserted in this session
    pub skip_duplicate_fragments: bool,
}

pub struct Editor {
    document: String,
    meta_tags: Vec<MetaTag>,
    renderer: PreviewRenderer,
    snapshots: SnapshotStore,
    options: EditorOptions,
    applied: HashSet<(Marker, String)>,
}

impl Editor {
    /// Start a session on `document` and render it once
    pub fn new(
        document: impl Into<String>,
        renderer: PreviewRenderer,
        snapshots: SnapshotStore,
        options: EditorOptions,
    ) -> Self {
        let mut editor = Self {
            document: document.into(),
            meta_tags: Vec::new(),
            renderer,
            snapshots,
            options,
            applied: HashSet::new(),
        };
        editor.renderer.render(&editor.document);
        editor
    }

    /// Start a session on the basic starter template
    pub fn with_basic_template(
        renderer: PreviewRenderer,
        snapshots: SnapshotStore,
        options: EditorOptions,
    ) -> Self {
        Self::new(BASIC_TEMPLATE, renderer, snapshots, options)
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn meta_tags(&self) -> &[MetaTag] {
        &self.meta_tags
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn renderer(&self) -> &PreviewRenderer {
        &self.renderer
    }

    fn commit(&mut self, document: String) {
        self.document = document;
        self.renderer.render(&self.document);
    }

    /// Replace the whole document; fragment tracking starts over
    fn replace(&mut self, document: String) {
        self.applied.clear();
        self.commit(document);
    }

    fn splice(&mut self, fragment: &str, marker: Marker, label: &str) -> Notice {
        let key = (marker, fragment.to_string());
        if self.options.skip_duplicate_fragments && self.applied.contains(&key) {
            return Notice::info(format!("{} already inserted", label));
        }

        match try_insert_fragment(&self.document, fragment, marker) {
            Ok(next) => {
                self.commit(next);
                self.applied.insert(key);
                Notice::success(format!("{} inserted", label))
            }
            Err(_) => match self.options.missing_marker {
                MissingMarkerPolicy::Ignore => Notice::success(format!("{} inserted", label)),
                MissingMarkerPolicy::Warn => {
                    warn!(%marker, label, "marker not found, document unchanged");
                    Notice::warning(format!(
                        "{} not inserted: {} not found in the template",
                        label, marker
                    ))
                }
                MissingMarkerPolicy::Append => {
                    let mut next = self.document.clone();
                    next.push_str(fragment);
                    self.commit(next);
                    self.applied.insert(key);
                    Notice::warning(format!(
                        "{} appended at the end: {} not found in the template",
                        label, marker
                    ))
                }
            },
        }
    }

    /// Insert `<name ...>content</name>` before `</body>`
    pub fn insert_tag(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        content: &str,
    ) -> TemplateResult<Notice> {
        validate_tag_name(name)?;
        for (key, _) in attributes {
            validate_attribute_name(name, key)?;
        }
        let fragment = build_tag_fragment(name, attributes, content);
        Ok(self.splice(&fragment, Marker::Body, &format!("<{}>", name)))
    }

    /// Queue a meta tag for the next [`Editor::apply_meta_tags`]
    pub fn add_meta_tag(&mut self, tag: MetaTag) -> TemplateResult<Notice> {
        tag.validate()?;
        self.meta_tags.push(tag);
        Ok(Notice::info(format!("{} meta tag(s) pending", self.meta_tags.len())))
    }

    pub fn remove_meta_tag(&mut self, index: usize) -> TemplateResult<MetaTag> {
        if index >= self.meta_tags.len() {
            return Err(TemplateError::MetaTagIndexOutOfRange {
                index,
                len: self.meta_tags.len(),
            });
        }
        Ok(self.meta_tags.remove(index))
    }

    /// Insert all pending meta tags as one block before `</head>`.
    /// The pending list is kept when nothing was inserted.
    pub fn apply_meta_tags(&mut self) -> TemplateResult<Notice> {
        if self.meta_tags.is_empty() {
            return Err(TemplateError::NoMetaTags);
        }
        let block = build_meta_block(&self.meta_tags);
        let label = format!("{} meta tag(s)", self.meta_tags.len());
        let notice = self.splice(&block, Marker::Head, &label);
        if !notice.is_warning() || self.options.missing_marker == MissingMarkerPolicy::Append {
            self.meta_tags.clear();
        }
        Ok(notice)
    }

    /// Link a Google font in `<head>` and set it as `font-family` for `selector`
    pub fn apply_font(&mut self, font: &FontFamily, selector: &str) -> TemplateResult<Notice> {
        require("font family", &font.family)?;
        validate_selector(selector)?;
        let link = google_fonts_link(&font.family, &font.weights());
        let rule = font_rule(&font.family, &font.category, selector);
        let label = format!("Font '{}'", font.family);
        let head = self.splice(&link, Marker::Head, &label);
        let style = self.splice(&rule.to_fragment(), Marker::Style, &label);
        Ok(head.worst(style))
    }

    /// Set `property: value` for `selector`
    pub fn apply_color(
        &mut self,
        name: &str,
        value: &str,
        selector: &str,
        property: &str,
    ) -> TemplateResult<Notice> {
        validate_hex_color(value)?;
        validate_selector(selector)?;
        require("property", property)?;
        let rule = color_rule(name, selector, property, value);
        Ok(self.splice(&rule.to_fragment(), Marker::Style, &format!("Color '{}'", name)))
    }

    pub fn apply_named_color(
        &mut self,
        color: &NamedColor,
        selector: &str,
        property: &str,
    ) -> TemplateResult<Notice> {
        self.apply_color(&color.name, &color.value, selector, property)
    }

    /// Set a gradient `background` for `selector`
    pub fn apply_gradient(
        &mut self,
        gradient: &NamedGradient,
        selector: &str,
    ) -> TemplateResult<Notice> {
        validate_selector(selector)?;
        let rule = gradient_rule(&gradient.name, selector, &gradient.css_value());
        Ok(self.splice(
            &rule.to_fragment(),
            Marker::Style,
            &format!("Gradient '{}'", gradient.name),
        ))
    }

    /// Hand edit from the text box
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.replace(text.into());
    }

    pub fn set_device_width(&mut self, width: DeviceWidth) -> bool {
        self.renderer.set_width(width)
    }

    /// Discard the document in favor of the starter template
    pub fn restore_basic(&mut self, confirm: &mut dyn Confirm) -> Notice {
        if !confirm.confirm("Restore the basic template? Unsaved changes will be lost.") {
            return Notice::info("Restore cancelled");
        }
        self.replace(BASIC_TEMPLATE.to_string());
        Notice::success("Basic template restored")
    }

    pub fn save_snapshot(&mut self, name: &str) -> TemplateResult<Snapshot> {
        self.snapshots.save(name, &self.document)
    }

    /// Replace the document with a saved snapshot
    pub fn load_snapshot(&mut self, id: &str, confirm: &mut dyn Confirm) -> TemplateResult<Notice> {
        let snapshot = self.snapshots.get(id)?;
        let prompt = format!(
            "Load template '{}'? Unsaved changes will be lost.",
            snapshot.name
        );
        if !confirm.confirm(&prompt) {
            return Ok(Notice::info("Load cancelled"));
        }
        let name = snapshot.name.clone();
        let code = snapshot.code.clone();
        self.replace(code);
        info!(id, "template loaded");
        Ok(Notice::success(format!("Template '{}' loaded", name)))
    }

    pub fn delete_snapshot(&mut self, id: &str, confirm: &mut dyn Confirm) -> TemplateResult<Notice> {
        let name = self.snapshots.get(id)?.name.clone();
        if !confirm.confirm(&format!("Delete template '{}'?", name)) {
            return Ok(Notice::info("Delete cancelled"));
        }
        self.snapshots.delete(id)?;
        Ok(Notice::success(format!("Template '{}' deleted", name)))
    }
}
