//! Template field audit
//!
//! Opens a generated template, lists every page's annotations and checks that
//! the required image fields are present. The report renders as the bilingual
//! operator text through its `Display` implementation.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::error::{AnnotationError, Error, Result};
use crate::fields::{is_required_image_field, missing_image_fields};
use crate::layout::Rectangle;
use crate::pdf::annotations::{page_annotation_entries, page_media_box, resolve_annotation};
use crate::pdf::{document_title, form_text_fields, Annotation, FormTextField};

/// What was found on one page
#[derive(Debug)]
pub struct PageReport {
    /// 1-based page number
    pub number: usize,
    pub media_box: Option<Rectangle>,
    /// `None` when the page has no `/Annots` key at all. Entries that could
    /// not be read are kept in place as [`AnnotationError`].
    pub annotations: Option<Vec<std::result::Result<Annotation, AnnotationError>>>,
}

/// A required image field and the page it was found on
#[derive(Debug, Clone, PartialEq)]
pub struct FoundField {
    pub name: String,
    pub page: usize,
}

/// Outcome of the required image field search
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredFieldCheck {
    /// Every occurrence, in page order
    pub found: Vec<FoundField>,
    /// Required names with no occurrence, in required order
    pub missing: Vec<&'static str>,
}

impl RequiredFieldCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Full audit of one template file
#[derive(Debug)]
pub struct AuditReport {
    pub path: PathBuf,
    /// `/Title` from the document info, if any
    pub title: Option<String>,
    pub pages: Vec<PageReport>,
    /// Document-level text fields from the AcroForm
    pub form_fields: Vec<FormTextField>,
    pub required: RequiredFieldCheck,
}

impl AuditReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every annotation that was read successfully, across all pages
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.pages
            .iter()
            .filter_map(|page| page.annotations.as_ref())
            .flatten()
            .filter_map(|entry| entry.as_ref().ok())
    }

    /// Look up a successfully read annotation by field name
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations()
            .find(|annotation| annotation.name.as_deref() == Some(name))
    }
}

/// Audit the template at `path`
///
/// Fails with [`Error::FileNotFound`] if the file does not exist and with
/// [`Error::PdfRead`] if it cannot be parsed. Problems with individual
/// annotations do not fail the audit.
pub fn audit(path: &Path) -> Result<AuditReport> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::PdfRead {
        path: path.to_path_buf(),
        source,
    })?;

    audit_document(path, &doc)
}

/// Audit an already loaded document
pub fn audit_document(path: &Path, doc: &Document) -> Result<AuditReport> {
    let pages = inspect_pages(doc)?;
    let form_fields = form_text_fields(doc)?;
    let required = check_required_fields(doc)?;

    log::debug!(
        "audited {}: {} pages, {} of {} image fields missing",
        path.display(),
        pages.len(),
        required.missing.len(),
        crate::fields::REQUIRED_IMAGE_FIELDS.len()
    );

    Ok(AuditReport {
        path: path.to_path_buf(),
        title: document_title(doc),
        pages,
        form_fields,
        required,
    })
}

/// First pass: media box and every annotation of every page
fn inspect_pages(doc: &Document) -> Result<Vec<PageReport>> {
    let mut reports = Vec::new();

    for (index, page_id) in doc.get_pages().into_values().enumerate() {
        let annotations = page_annotation_entries(doc, page_id)?.map(|entries| {
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    resolve_annotation(doc, entry).map_err(|e| {
                        log::debug!("page {}: annotation {} unreadable: {}", index + 1, i + 1, e);
                        AnnotationError {
                            index: i + 1,
                            message: e.to_string(),
                        }
                    })
                })
                .collect::<Vec<_>>()
        });

        reports.push(PageReport {
            number: index + 1,
            media_box: page_media_box(doc, page_id),
            annotations,
        });
    }

    Ok(reports)
}

/// Second pass: walk the pages again looking only for required image fields
///
/// Unreadable annotations are skipped silently here.
fn check_required_fields(doc: &Document) -> Result<RequiredFieldCheck> {
    let mut found = Vec::new();

    for (index, page_id) in doc.get_pages().into_values().enumerate() {
        let entries = match page_annotation_entries(doc, page_id)? {
            Some(entries) => entries,
            None => continue,
        };

        for entry in entries {
            let annotation = match resolve_annotation(doc, entry) {
                Ok(annotation) => annotation,
                Err(_) => continue,
            };
            if let Some(name) = annotation.name {
                if is_required_image_field(&name) {
                    found.push(FoundField {
                        name,
                        page: index + 1,
                    });
                }
            }
        }
    }

    let missing = missing_image_fields(found.iter().map(|f| f.name.as_str()));
    Ok(RequiredFieldCheck { found, missing })
}

/// Audit `path` and write the report to `out`
///
/// Audit failures are written as messages, never returned; the only error
/// this returns is a failure to write to `out`.
pub fn run_audit<W: Write>(path: &Path, out: &mut W) -> io::Result<()> {
    match audit(path) {
        Ok(report) => write!(out, "{report}"),
        Err(Error::FileNotFound(path)) => writeln!(
            out,
            "❌ File not found / لم يتم العثور على الملف: {}",
            path.display()
        ),
        Err(e) => writeln!(out, "❌ Error reading PDF file / خطأ في قراءة ملف PDF: {e}"),
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📄 PDF file / ملف PDF: {}", self.path.display())?;
        if let Some(title) = &self.title {
            writeln!(f, "🏷️ Title / العنوان: {title}")?;
        }
        writeln!(f, "📊 Pages / عدد الصفحات: {}", self.page_count())?;
        writeln!(f, "{}", "-".repeat(50))?;

        for page in &self.pages {
            write!(f, "{page}")?;
        }

        if !self.form_fields.is_empty() {
            writeln!(f)?;
            writeln!(f, "📝 Form fields in document / حقول النماذج في المستند:")?;
            for field in &self.form_fields {
                writeln!(
                    f,
                    "   {}: {}",
                    field.name,
                    field.value.as_deref().unwrap_or("")
                )?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "🔍 Searching for required image fields / البحث عن حقول الصور المطلوبة:"
        )?;
        for found in &self.required.found {
            writeln!(
                f,
                "   ✅ Found / وُجد: {} on page / في الصفحة {}",
                found.name, found.page
            )?;
        }
        if self.required.is_complete() {
            writeln!(f, "   🎉 All image fields present / جميع حقول الصور موجودة!")
        } else {
            writeln!(
                f,
                "   ❌ Missing / مفقود: [{}]",
                self.required.missing.join(", ")
            )
        }
    }
}

impl fmt::Display for PageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "📖 Page / الصفحة {}:", self.number)?;

        if let Some(media_box) = &self.media_box {
            writeln!(f, "   Page size / أبعاد الصفحة: {media_box}")?;
        }

        let annotations = match &self.annotations {
            Some(annotations) => annotations,
            None => return writeln!(f, "   ❌ No fields on this page / لا توجد حقول في هذه الصفحة"),
        };

        writeln!(
            f,
            "   Fields/annotations / عدد الحقول/التعليقات: {}",
            annotations.len()
        )?;

        for (i, entry) in annotations.iter().enumerate() {
            match entry {
                Ok(annotation) => {
                    let name = annotation.name.as_deref().unwrap_or("");
                    let subtype = annotation
                        .subtype
                        .as_deref()
                        .map(|s| format!("/{s}"))
                        .unwrap_or_default();
                    let rect = annotation
                        .rect
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "[]".to_string());

                    writeln!(f, "      {}. Field name / اسم الحقل: '{}'", i + 1, name)?;
                    writeln!(f, "         Field type / نوع الحقل: {subtype}")?;
                    writeln!(f, "         Position / الموضع: {rect}")?;
                    if is_required_image_field(name) {
                        writeln!(
                            f,
                            "         ✅ Required image field / هذا حقل صورة مطلوب!"
                        )?;
                    }
                    writeln!(f)?;
                }
                Err(AnnotationError { index, message }) => {
                    writeln!(
                        f,
                        "         Error reading field / خطأ في قراءة الحقل {index}: {message}"
                    )?;
                }
            }
        }

        Ok(())
    }
}
