//! File exports of the template and of generated prompt text.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::TemplateResult;
use crate::validator::require;

pub const TEMPLATE_FILE_NAME: &str = "template-blogspot.xml";

/// Write the document verbatim to `<dir>/template-blogspot.xml`
pub fn export_template(document: &str, dir: &Path) -> TemplateResult<PathBuf> {
    write_file(dir, TEMPLATE_FILE_NAME, document)
}

/// Write prompt text to `<dir>/<file_name>`; `.txt` is added if missing
pub fn export_prompt(text: &str, dir: &Path, file_name: &str) -> TemplateResult<PathBuf> {
    require("file name", file_name)?;
    let file_name = if file_name.ends_with(".txt") {
        file_name.to_string()
    } else {
        format!("{}.txt", file_name)
    };
    write_file(dir, &file_name, text)
}

fn write_file(dir: &Path, file_name: &str, contents: &str) -> TemplateResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    info!(path = %path.display(), bytes = contents.len(), "exported");
    Ok(path)
}
