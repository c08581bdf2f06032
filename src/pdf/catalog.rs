//! Document-level information: the info dictionary and the AcroForm field tree

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};
use crate::pdf::annotations::decode_text;

/// A text field from the document's interactive form
#[derive(Debug, Clone, PartialEq)]
pub struct FormTextField {
    /// Fully qualified name, partial names joined with `.`
    pub name: String,
    /// Current value (`/V`), if any
    pub value: Option<String>,
}

/// Follow a reference to its dictionary; direct dictionaries pass through
fn resolve_dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary> {
    match obj {
        Object::Reference(id) => Ok(doc.get_dictionary(*id)?),
        Object::Dictionary(dict) => Ok(dict),
        _ => Err(Error::General("expected a dictionary".to_string())),
    }
}

/// Get the catalog dictionary through the trailer's `/Root`
fn catalog(doc: &Document) -> Result<&Dictionary> {
    let root = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;
    resolve_dictionary(doc, root)
}

/// Document title from the info dictionary, if present
pub fn document_title(doc: &Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = resolve_dictionary(doc, info).ok()?;
    let title = info.get(b"Title").ok()?;
    decode_text(title)
}

/// Collect every text field (`/FT /Tx`) in the document's AcroForm
///
/// Walks `/Fields` and their `/Kids`, with `/FT` inherited from parents.
/// Documents without an interactive form yield an empty list.
pub fn form_text_fields(doc: &Document) -> Result<Vec<FormTextField>> {
    let catalog = catalog(doc)?;

    let acroform = match catalog.get(b"AcroForm") {
        Ok(obj) => resolve_dictionary(doc, obj)?,
        Err(_) => return Ok(Vec::new()),
    };

    let fields = match acroform.get(b"Fields") {
        Ok(Object::Array(fields)) => fields,
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_array()?,
        _ => return Ok(Vec::new()),
    };

    let mut out = Vec::new();
    for field in fields {
        collect_text_fields(doc, field, None, None, &mut out, 0)?;
    }
    Ok(out)
}

/// Field trees deeper than this are treated as cyclic
const MAX_FIELD_DEPTH: usize = 32;

fn collect_text_fields(
    doc: &Document,
    field: &Object,
    parent_name: Option<&str>,
    parent_type: Option<&[u8]>,
    out: &mut Vec<FormTextField>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_FIELD_DEPTH {
        log::warn!("form field tree deeper than {}, stopping", MAX_FIELD_DEPTH);
        return Ok(());
    }

    let dict = match resolve_dictionary(doc, field) {
        Ok(dict) => dict,
        Err(e) => {
            log::warn!("skipping unreadable form field {:?}: {}", field, e);
            return Ok(());
        }
    };

    let partial = dict.get(b"T").ok().and_then(decode_text);
    let name = match (parent_name, partial) {
        (Some(parent), Some(partial)) => Some(format!("{parent}.{partial}")),
        (None, Some(partial)) => Some(partial),
        (parent, None) => parent.map(str::to_string),
    };

    let field_type = dict
        .get(b"FT")
        .ok()
        .and_then(|ft| ft.as_name().ok())
        .or(parent_type);

    // Kids that carry their own /T are fields; the rest are widgets of this one
    let named_kids: Vec<&Object> = match dict.get(b"Kids") {
        Ok(Object::Array(kids)) => kids
            .iter()
            .filter(|kid| {
                resolve_dictionary(doc, kid)
                    .map(|d| d.has(b"T"))
                    .unwrap_or(false)
            })
            .collect(),
        _ => Vec::new(),
    };

    if !named_kids.is_empty() {
        for kid in named_kids {
            collect_text_fields(doc, kid, name.as_deref(), field_type, out, depth + 1)?;
        }
        return Ok(());
    }

    if field_type == Some(b"Tx".as_slice()) {
        if let Some(name) = name {
            let value = dict.get(b"V").ok().and_then(decode_text);
            out.push(FormTextField { name, value });
        }
    }

    Ok(())
}
