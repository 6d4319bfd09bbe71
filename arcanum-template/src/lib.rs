//! # Arcanum template studio
//!
//! Edits Blogger/Blogspot templates held as plain text. Every change is a
//! fragment spliced before a closing marker (`</head>`, `</style>`,
//! `</body>`), followed by a full rewrite of the preview.
//!
//! ## Features
//! - Tag, CSS rule and meta tag fragment builders
//! - Marker splicing with a configurable missing-marker policy
//! - Live preview into a file or in-memory surface, per device width
//! - Named snapshots, colors, gradients and prompt bundles in a local key-value store
//! - Google Fonts catalog with an offline fallback
//!
//! ## Example
//! ```ignore
//! use std::sync::Arc;
//! use arcanum_template::{Editor, EditorOptions, MemoryStore, MemorySurface, PreviewRenderer, SnapshotStore};
//!
//! let renderer = PreviewRenderer::new(Box::new(MemorySurface::new()));
//! let snapshots = SnapshotStore::open(Arc::new(MemoryStore::new()));
//! let mut editor = Editor::with_basic_template(renderer, snapshots, EditorOptions::default());
//!
//! let attrs = vec![("class".to_string(), "container".to_string())];
//! editor.insert_tag("div", &attrs, "Hello")?;
//! editor.save_snapshot("Portada")?;
//! ```

pub mod config;
pub mod css;
pub mod editor;
pub mod error;
pub mod export;
pub mod font;
pub mod meta;
pub mod preview;
pub mod splice;
pub mod starter;
pub mod store;
pub mod tag;
pub mod validator;

// --- Core types ---
pub use config::Config;
pub use editor::{AlwaysConfirm, Confirm, Editor, EditorOptions, Notice, NoticeLevel};
pub use error::{TemplateError, TemplateResult};
pub use font::FontFamily;
pub use meta::{MetaKind, MetaTag};
pub use preview::{DeviceWidth, FileSurface, MemorySurface, PreviewRenderer, PreviewSurface};
pub use splice::{insert_fragment, Marker, MissingMarkerPolicy};
pub use starter::BASIC_TEMPLATE;

// --- Persistence ---
pub use store::{
    ColorStore, FileStore, GradientKind, GradientStore, KeyValueStore, MemoryStore, NamedColor,
    NamedGradient, PromptBundle, PromptBundleStore, Snapshot, SnapshotStore,
};
