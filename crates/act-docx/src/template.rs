//! DOCX package handling
//!
//! A `.docx` file is a ZIP package. The main document part plus any header
//! and footer parts are rendered; every other entry is copied through.

use crate::engine;
use crate::error::RenderError;
use crate::value::RenderContext;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// MIME type of generated documents
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Main document part
pub const MAIN_PART: &str = "word/document.xml";

/// Download filename stamped with a date: `Act_YYYY-MM-DD.docx`
#[must_use]
pub fn output_filename(date: NaiveDate) -> String {
    format!("Act_{}.docx", date.format("%Y-%m-%d"))
}

/// Turns a render context into document bytes
pub trait DocumentRenderer: Send + Sync {
    /// Render the document
    ///
    /// # Errors
    /// `RenderError` when the template is missing, malformed or a value does
    /// not fit its placeholder. No partial document is produced.
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError>;
}

fn is_template_part(name: &str) -> bool {
    name == MAIN_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// Parsed DOCX template held in memory
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    entries: Vec<Entry>,
}

impl DocxTemplate {
    /// Read a template from package bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| RenderError::Malformed(format!("not a document package: {e}")))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| RenderError::Malformed(format!("unreadable entry {i}: {e}")))?;
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| RenderError::Malformed(format!("unreadable entry {name}: {e}")))?;
            entries.push(Entry {
                is_dir: file.is_dir(),
                name,
                data,
            });
        }

        if !entries.iter().any(|e| e.name == MAIN_PART) {
            return Err(RenderError::Malformed(format!("missing {MAIN_PART}")));
        }
        Ok(Self { entries })
    }

    /// Read a template file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| RenderError::io_error(path, e))?;
        Self::from_bytes(&bytes)
    }

    fn part_text(entry: &Entry) -> Result<&str, RenderError> {
        std::str::from_utf8(&entry.data)
            .map_err(|_| RenderError::Malformed(format!("{} is not UTF-8", entry.name)))
    }

    /// Context names referenced by the rendered parts
    pub fn placeholders(&self) -> Result<BTreeSet<String>, RenderError> {
        let mut names = BTreeSet::new();
        for entry in self.entries.iter().filter(|e| is_template_part(&e.name)) {
            names.extend(engine::placeholders(&entry.name, Self::part_text(entry)?)?);
        }
        Ok(names)
    }

    /// Render the template into a new package
    pub fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        let output = |e: zip::result::ZipError| RenderError::Output(e.to_string());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(output)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options).map_err(output)?;
            if is_template_part(&entry.name) {
                let rendered = engine::render_part(&entry.name, Self::part_text(entry)?, context)?;
                writer
                    .write_all(rendered.as_bytes())
                    .map_err(|e| RenderError::Output(e.to_string()))?;
            } else {
                writer
                    .write_all(&entry.data)
                    .map_err(|e| RenderError::Output(e.to_string()))?;
            }
        }

        let bytes = writer.finish().map_err(output)?.into_inner();
        tracing::debug!("Rendered document: {} bytes", bytes.len());
        Ok(bytes)
    }
}

impl DocumentRenderer for DocxTemplate {
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        DocxTemplate::render(self, context)
    }
}

/// Renderer that reads its template from disk on every call
///
/// Editing the template file takes effect on the next render without a
/// restart.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    path: PathBuf,
}

impl TemplateRenderer {
    /// Create renderer for a template path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Template path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentRenderer for TemplateRenderer {
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        DocxTemplate::open(&self.path)?.render(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{RecordValue, RichText};
    use pretty_assertions::assert_eq;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    const DOCUMENT: &str = concat!(
        r#"<w:document><w:body>"#,
        r#"<w:p><w:r><w:t>Object: {{ OBJECT }}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{{r FIRE }}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{%p for d in dsns_list %}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{{ d.pos }} {{ d.name }}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{%p endfor %}</w:t></w:r></w:p>"#,
        r#"</w:body></w:document>"#
    );

    fn context() -> RenderContext {
        RenderContext::new()
            .with("OBJECT", "School")
            .with("FIRE", RichText::new("1. Text X"))
            .with(
                "dsns_list",
                vec![RecordValue::new().with("pos", "Inspector").with("name", "Ivanenko")],
            )
    }

    #[test]
    fn renders_document_header_and_copies_other_parts() {
        let template = DocxTemplate::from_bytes(&package(&[
            ("[Content_Types].xml", "<Types/>"),
            (MAIN_PART, DOCUMENT),
            ("word/header1.xml", "<w:hdr><w:t>{{ OBJECT }}</w:t></w:hdr>"),
            ("word/styles.xml", "<w:styles>{{ untouched }}</w:styles>"),
        ]))
        .unwrap();

        let bytes = template.render(&context()).unwrap();

        let document = read_part(&bytes, MAIN_PART);
        assert!(document.contains("Object: School"));
        assert!(document.contains(r#"<w:t xml:space="preserve">1. Text X</w:t>"#));
        assert!(document.contains("Inspector Ivanenko"));
        assert!(!document.contains("{%"));
        assert_eq!(read_part(&bytes, "word/header1.xml"), "<w:hdr><w:t>School</w:t></w:hdr>");
        assert_eq!(read_part(&bytes, "word/styles.xml"), "<w:styles>{{ untouched }}</w:styles>");
        assert_eq!(read_part(&bytes, "[Content_Types].xml"), "<Types/>");
    }

    #[test]
    fn lists_placeholders() {
        let template = DocxTemplate::from_bytes(&package(&[(MAIN_PART, DOCUMENT)])).unwrap();
        let names: Vec<_> = template.placeholders().unwrap().into_iter().collect();
        assert_eq!(names, vec!["FIRE", "OBJECT", "dsns_list"]);
    }

    #[test]
    fn rejects_non_zip_bytes() {
        assert!(matches!(
            DocxTemplate::from_bytes(b"plain text"),
            Err(RenderError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_package_without_main_part() {
        let bytes = package(&[("word/styles.xml", "<w:styles/>")]);
        assert!(matches!(
            DocxTemplate::from_bytes(&bytes),
            Err(RenderError::Malformed(_))
        ));
    }

    #[test]
    fn missing_template_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path().join("template.docx"));
        assert!(matches!(
            renderer.render(&context()),
            Err(RenderError::TemplateIo { .. })
        ));
    }

    #[test]
    fn template_renderer_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");
        std::fs::write(&path, package(&[(MAIN_PART, DOCUMENT)])).unwrap();

        let bytes = TemplateRenderer::new(&path).render(&context()).unwrap();
        assert!(read_part(&bytes, MAIN_PART).contains("Object: School"));
    }

    #[test]
    fn type_mismatch_produces_no_document() {
        let template = DocxTemplate::from_bytes(&package(&[(MAIN_PART, DOCUMENT)])).unwrap();
        let ctx = context().with("OBJECT", RichText::new("1. oops"));
        assert!(matches!(
            template.render(&ctx),
            Err(RenderError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn filename_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(output_filename(date), "Act_2026-10-15.docx");
    }
}
