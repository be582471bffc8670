//! Markdown text to PDF.
//!
//! The configured TTF family is used when it can be loaded from the fonts
//! directory, with the Markdown laid out as headings, paragraphs and lists.
//! Otherwise the raw text is written with builtin Helvetica after ASCII
//! transliteration, so rendering never fails for lack of a font.

pub mod blocks;
mod embedded;
pub mod fallback;

use crate::config::PdfConfig;
use crate::error::RenderError;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    fonts_dir: PathBuf,
    font_family: String,
}

impl PdfRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
        }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(&config.fonts_dir, &config.font_family)
    }

    /// Render Markdown `text` into PDF bytes.
    pub fn render(&self, title: &str, text: &str) -> Result<Vec<u8>, RenderError> {
        match genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None) {
            Ok(family) => embedded::render(family, title, &blocks::parse_blocks(text)),
            Err(e) => {
                warn!(
                    "Font family '{}' not loadable from {} ({}), using builtin Helvetica",
                    self.font_family,
                    self.fonts_dir.display(),
                    e
                );
                fallback::render(title, text)
            }
        }
    }

    /// Render and write the PDF to `path`, returning the bytes as well.
    pub fn export(&self, title: &str, text: &str, path: &Path) -> Result<Vec<u8>, RenderError> {
        let bytes = self.render(title, text)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;
        info!("PDF written to {}", path.display());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fonts_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path(), "NoSuchFont");
        let bytes = renderer
            .render("Algebra", "# Algebra\n\nLinear **equations**.")
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn export_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path().join("fonts"), "NoSuchFont");
        let path = dir.path().join("out").join("course.pdf");

        let bytes = renderer.export("课程", "# 课程\n\n内容", &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
