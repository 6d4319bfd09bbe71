//! Live preview: the whole document is rewritten into a surface on every change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::TemplateError;

/// Target device width for the preview frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceWidth {
    #[default]
    Desktop,
    Tablet,
    Mobile,
    Custom(u32),
}

impl DeviceWidth {
    /// CSS width of the frame
    pub fn css_width(&self) -> String {
        match self {
            DeviceWidth::Desktop => "100%".to_string(),
            DeviceWidth::Tablet => "768px".to_string(),
            DeviceWidth::Mobile => "375px".to_string(),
            DeviceWidth::Custom(px) => format!("{}px", px),
        }
    }
}

impl FromStr for DeviceWidth {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "desktop" => Ok(DeviceWidth::Desktop),
            "tablet" => Ok(DeviceWidth::Tablet),
            "mobile" => Ok(DeviceWidth::Mobile),
            other => other
                .trim_end_matches("px")
                .parse::<u32>()
                .ok()
                .filter(|px| *px > 0)
                .map(DeviceWidth::Custom)
                .ok_or_else(|| TemplateError::InvalidDeviceWidth {
                    value: s.to_string(),
                }),
        }
    }
}

impl TryFrom<String> for DeviceWidth {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceWidth> for String {
    fn from(width: DeviceWidth) -> Self {
        width.to_string()
    }
}

impl fmt::Display for DeviceWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceWidth::Desktop => f.write_str("desktop"),
            DeviceWidth::Tablet => f.write_str("tablet"),
            DeviceWidth::Mobile => f.write_str("mobile"),
            DeviceWidth::Custom(px) => write!(f, "{}px", px),
        }
    }
}

/// A writable preview document: `open` clears it, `write` appends text,
/// `close` commits what was written.
pub trait PreviewSurface {
    fn open(&mut self) -> io::Result<()>;
    fn write(&mut self, text: &str) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;

    fn resize(&mut self, _width: DeviceWidth) -> io::Result<()> {
        Ok(())
    }
}

/// Surface that keeps the committed document in memory
#[derive(Debug, Default)]
pub struct MemorySurface {
    buffer: String,
    committed: String,
    width: DeviceWidth,
    commits: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document as of the last `close`
    pub fn contents(&self) -> &str {
        &self.committed
    }

    pub fn width(&self) -> DeviceWidth {
        self.width
    }

    /// Number of completed open/write/close cycles
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl PreviewSurface for MemorySurface {
    fn open(&mut self) -> io::Result<()> {
        self.buffer.clear();
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.committed = std::mem::take(&mut self.buffer);
        self.commits += 1;
        Ok(())
    }

    fn resize(&mut self, width: DeviceWidth) -> io::Result<()> {
        self.width = width;
        Ok(())
    }
}

/// Surface backed by two files in a directory: `frame.html` holds the
/// document, `index.html` embeds it at the selected width.
#[derive(Debug)]
pub struct FileSurface {
    dir: PathBuf,
    buffer: String,
    width: DeviceWidth,
}

pub const FRAME_FILE: &str = "frame.html";
pub const INDEX_FILE: &str = "index.html";

impl FileSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            buffer: String::new(),
            width: DeviceWidth::Desktop,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn shell(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>Preview ({label})</title>\n\
<style>html,body{{margin:0;background:#1a1025;}}iframe{{display:block;margin:0 auto;border:0;background:#fff;height:100vh;width:{width};}}</style>\n\
</head>\n<body>\n<iframe src=\"{frame}\" title=\"preview\"></iframe>\n</body>\n</html>\n",
            label = self.width,
            width = self.width.css_width(),
            frame = FRAME_FILE,
        )
    }
}

impl PreviewSurface for FileSurface {
    fn open(&mut self) -> io::Result<()> {
        self.buffer.clear();
        fs::create_dir_all(&self.dir)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        fs::write(self.dir.join(FRAME_FILE), &self.buffer)?;
        fs::write(self.dir.join(INDEX_FILE), self.shell())?;
        self.buffer.clear();
        Ok(())
    }

    fn resize(&mut self, width: DeviceWidth) -> io::Result<()> {
        self.width = width;
        Ok(())
    }
}

/// Pushes document text into a surface.
///
/// Renders are skipped only when both the text and the width are unchanged
/// since the last successful render.
pub struct PreviewRenderer {
    surface: Box<dyn PreviewSurface>,
    width: DeviceWidth,
    /// Last document handed to `render`, whether or not it reached the surface
    requested: Option<String>,
    /// Last document the surface committed
    committed: Option<String>,
    renders: usize,
}

impl PreviewRenderer {
    pub fn new(surface: Box<dyn PreviewSurface>) -> Self {
        Self {
            surface,
            width: DeviceWidth::Desktop,
            requested: None,
            committed: None,
            renders: 0,
        }
    }

    pub fn width(&self) -> DeviceWidth {
        self.width
    }

    /// Completed renders since creation
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Rewrite the surface with `doc`. Returns false if nothing changed or
    /// the surface failed; failures are logged, never returned.
    pub fn render(&mut self, doc: &str) -> bool {
        if self.committed.as_deref() == Some(doc) {
            return false;
        }
        self.requested = Some(doc.to_string());
        self.write_through(doc)
    }

    /// Change the frame width and re-render the last requested document,
    /// including one whose previous render failed
    pub fn set_width(&mut self, width: DeviceWidth) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        if let Err(e) = self.surface.resize(width) {
            warn!(error = %e, %width, "preview resize failed");
        }
        match self.requested.clone() {
            Some(doc) => self.write_through(&doc),
            None => false,
        }
    }

    fn write_through(&mut self, doc: &str) -> bool {
        let result = self
            .surface
            .open()
            .and_then(|_| self.surface.write(doc))
            .and_then(|_| self.surface.close());
        match result {
            Ok(()) => {
                self.committed = Some(doc.to_string());
                self.renders += 1;
                debug!(bytes = doc.len(), width = %self.width, "preview rendered");
                true
            }
            Err(e) => {
                self.committed = None;
                warn!(error = %e, "preview render failed");
                false
            }
        }
    }
}

/// Shared handle so tests and callers can inspect a surface the renderer owns
impl<S: PreviewSurface + ?Sized> PreviewSurface for std::rc::Rc<std::cell::RefCell<S>> {
    fn open(&mut self) -> io::Result<()> {
        self.borrow_mut().open()
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.borrow_mut().write(text)
    }

    fn close(&mut self) -> io::Result<()> {
        self.borrow_mut().close()
    }

    fn resize(&mut self, width: DeviceWidth) -> io::Result<()> {
        self.borrow_mut().resize(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shared() -> (Rc<RefCell<MemorySurface>>, PreviewRenderer) {
        let surface = Rc::new(RefCell::new(MemorySurface::new()));
        let renderer = PreviewRenderer::new(Box::new(surface.clone()));
        (surface, renderer)
    }

    #[test]
    fn test_render_writes_whole_document() {
        let (surface, mut renderer) = shared();
        assert!(renderer.render("<p>uno</p>"));
        assert!(renderer.render("<p>dos</p>"));
        assert_eq!(surface.borrow().contents(), "<p>dos</p>");
        assert_eq!(surface.borrow().commits(), 2);
    }

    #[test]
    fn test_identical_text_not_rerendered() {
        let (surface, mut renderer) = shared();
        renderer.render("<p>x</p>");
        assert!(!renderer.render("<p>x</p>"));
        assert_eq!(surface.borrow().commits(), 1);
    }

    #[test]
    fn test_width_change_rerenders() {
        let (surface, mut renderer) = shared();
        renderer.render("<p>x</p>");
        assert!(renderer.set_width(DeviceWidth::Mobile));
        assert!(!renderer.set_width(DeviceWidth::Mobile));
        assert_eq!(surface.borrow().commits(), 2);
        assert_eq!(surface.borrow().width(), DeviceWidth::Mobile);
        assert_eq!(surface.borrow().contents(), "<p>x</p>");
    }

    #[test]
    fn test_device_width_parse() {
        assert_eq!("tablet".parse::<DeviceWidth>().unwrap(), DeviceWidth::Tablet);
        assert_eq!("1024".parse::<DeviceWidth>().unwrap(), DeviceWidth::Custom(1024));
        assert_eq!("320px".parse::<DeviceWidth>().unwrap(), DeviceWidth::Custom(320));
        assert!("0".parse::<DeviceWidth>().is_err());
        assert!("watch".parse::<DeviceWidth>().is_err());
        assert_eq!(DeviceWidth::Mobile.css_width(), "375px");
    }

    #[test]
    fn test_file_surface_writes_frame_and_shell() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = PreviewRenderer::new(Box::new(FileSurface::new(dir.path().join("preview"))));
        renderer.render("<html><body>hola</body></html>");
        renderer.set_width(DeviceWidth::Tablet);

        let frame = fs::read_to_string(dir.path().join("preview").join(FRAME_FILE)).unwrap();
        assert_eq!(frame, "<html><body>hola</body></html>");
        let index = fs::read_to_string(dir.path().join("preview").join(INDEX_FILE)).unwrap();
        assert!(index.contains("width:768px"));
        assert!(index.contains("src=\"frame.html\""));
    }

    struct BrokenSurface;

    impl PreviewSurface for BrokenSurface {
        fn open(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "gone"))
        }
        fn write(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails the first `open`, then behaves like a memory surface
    struct FlakySurface {
        failures_left: usize,
        inner: MemorySurface,
    }

    impl PreviewSurface for FlakySurface {
        fn open(&mut self) -> io::Result<()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "busy"));
            }
            self.inner.open()
        }
        fn write(&mut self, text: &str) -> io::Result<()> {
            self.inner.write(text)
        }
        fn close(&mut self) -> io::Result<()> {
            self.inner.close()
        }
        fn resize(&mut self, width: DeviceWidth) -> io::Result<()> {
            self.inner.resize(width)
        }
    }

    #[test]
    fn test_width_change_recovers_failed_render() {
        let surface = Rc::new(RefCell::new(FlakySurface {
            failures_left: 1,
            inner: MemorySurface::new(),
        }));
        let mut renderer = PreviewRenderer::new(Box::new(surface.clone()));
        assert!(!renderer.render("<p>x</p>"));
        assert_eq!(surface.borrow().inner.contents(), "");

        assert!(renderer.set_width(DeviceWidth::Mobile));
        assert_eq!(surface.borrow().inner.contents(), "<p>x</p>");
        assert_eq!(surface.borrow().inner.width(), DeviceWidth::Mobile);
        assert!(!renderer.render("<p>x</p>"));
    }

    #[test]
    fn test_surface_failure_is_absorbed() {
        let mut renderer = PreviewRenderer::new(Box::new(BrokenSurface));
        assert!(!renderer.render("<p>x</p>"));
        assert_eq!(renderer.renders(), 0);
    }
}
