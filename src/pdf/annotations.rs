//! Page annotation extraction using lopdf
//!
//! Annotation entries in `/Annots` are normally indirect references, so each
//! one is dereferenced against the document's object table before its keys
//! are read. Keys that are missing or malformed are left unset; only an entry
//! that cannot be resolved to a dictionary is an error.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::layout::Rectangle;

/// What the auditor needs to know about one annotation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    /// Field name (`/T`)
    pub name: Option<String>,
    /// Annotation subtype (`/Subtype`) without the leading slash
    pub subtype: Option<String>,
    /// Bounding rectangle (`/Rect`)
    pub rect: Option<Rectangle>,
}

/// Decode a text string value (`/T`, `/V`, `/Title`)
///
/// Follows the byte order mark: UTF-16BE, UTF-8, or PDFDocEncoding without one.
pub fn decode_text(obj: &Object) -> Option<String> {
    match lopdf::decode_text_string(obj) {
        Ok(text) => Some(text),
        Err(e) => {
            log::debug!("undecodable text string: {}", e);
            None
        }
    }
}

/// Name value without the leading slash
fn name_text(obj: &Object) -> Option<String> {
    obj.as_name()
        .ok()
        .map(|name| String::from_utf8_lossy(name).into_owned())
}

/// Read a four-number rectangle, resolving an indirect array if needed
pub fn read_rectangle(doc: &Document, obj: &Object) -> Option<Rectangle> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values: Vec<f32> = obj
        .as_array()
        .ok()?
        .iter()
        .map(|v| v.as_float().ok())
        .collect::<Option<Vec<f32>>>()?;

    match values.as_slice() {
        [x0, y0, x1, y1] => Some(Rectangle::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// Dereference one `/Annots` entry and pull out its name, subtype and rect
pub fn resolve_annotation(doc: &Document, entry: &Object) -> Result<Annotation> {
    let obj = match entry {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };

    let dict = match obj {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return Err(Error::General("annotation is not a dictionary".to_string())),
    };

    Ok(Annotation {
        name: dict.get(b"T").ok().and_then(decode_text),
        subtype: dict.get(b"Subtype").ok().and_then(name_text),
        rect: dict.get(b"Rect").ok().and_then(|r| read_rectangle(doc, r)),
    })
}

/// Find an entry on the page or, failing that, on its `/Parent` chain
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    // Page trees are shallow; the bound guards against /Parent cycles
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page media box, if the page (or an ancestor) declares a valid one
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Option<Rectangle> {
    let page = doc.get_dictionary(page_id).ok()?;
    inherited(doc, page, b"MediaBox").and_then(|mb| read_rectangle(doc, mb))
}

/// The page's `/Annots` entries, or `None` if the page has no such key
///
/// The array itself may be stored indirectly.
pub fn page_annotation_entries(doc: &Document, page_id: ObjectId) -> Result<Option<&[Object]>> {
    let page = doc.get_dictionary(page_id)?;

    let annots = match page.get(b"Annots") {
        Ok(annots) => annots,
        Err(_) => return Ok(None),
    };

    let annots = match annots {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };

    Ok(Some(annots.as_array()?.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn annotation_dict(name: Option<&str>, rect: Option<Vec<Object>>) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Annot".to_vec()));
        dict.set("Subtype", Object::Name(b"Widget".to_vec()));
        if let Some(name) = name {
            dict.set(
                "T",
                Object::String(name.as_bytes().to_vec(), StringFormat::Literal),
            );
        }
        if let Some(rect) = rect {
            dict.set("Rect", Object::Array(rect));
        }
        dict
    }

    #[test]
    fn test_resolve_indirect_annotation() {
        let mut doc = Document::with_version("1.7");
        let id = doc.add_object(Object::Dictionary(annotation_dict(
            Some("email"),
            Some(vec![
                Object::Integer(150),
                Object::Real(696.89),
                Object::Integer(450),
                Object::Real(716.89),
            ]),
        )));

        let annotation = resolve_annotation(&doc, &Object::Reference(id)).unwrap();
        assert_eq!(annotation.name.as_deref(), Some("email"));
        assert_eq!(annotation.subtype.as_deref(), Some("Widget"));
        assert_eq!(
            annotation.rect,
            Some(Rectangle::new(150.0, 696.89, 450.0, 716.89))
        );
    }

    #[test]
    fn test_missing_keys_are_left_unset() {
        let doc = Document::with_version("1.7");
        let mut dict = annotation_dict(None, Some(vec![Object::Integer(1)]));
        dict.remove(b"Subtype");

        let annotation = resolve_annotation(&doc, &Object::Dictionary(dict)).unwrap();
        assert_eq!(annotation, Annotation::default());
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let doc = Document::with_version("1.7");
        let result = resolve_annotation(&doc, &Object::Reference((42, 0)));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_dictionary_is_an_error() {
        let doc = Document::with_version("1.7");
        let result = resolve_annotation(&doc, &Object::Integer(7));
        assert!(matches!(result, Err(Error::General(_))));
    }

    #[test]
    fn test_decode_utf16_text() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Image_1".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let obj = Object::String(bytes, StringFormat::Hexadecimal);
        assert_eq!(decode_text(&obj).as_deref(), Some("Image_1"));
    }

    #[test]
    fn test_decode_pdfdoc_text() {
        // 0x80 is a bullet in PDFDocEncoding, not a Latin-1 control
        let obj = Object::String(vec![0x80, 0x20, 0x43, 0x61, 0x66, 0xE9], StringFormat::Literal);
        assert_eq!(decode_text(&obj).as_deref(), Some("\u{2022} Café"));
    }

    #[test]
    fn test_non_ascii_field_name() {
        let doc = Document::with_version("1.7");
        let mut dict = annotation_dict(None, None);
        dict.set("T", lopdf::text_string("صورة_1"));

        let annotation = resolve_annotation(&doc, &Object::Dictionary(dict)).unwrap();
        assert_eq!(annotation.name.as_deref(), Some("صورة_1"));
        assert_eq!(annotation.subtype.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_name_is_not_a_text_string() {
        assert_eq!(decode_text(&Object::Name(b"Widget".to_vec())), None);
        assert_eq!(name_text(&Object::Name(b"Widget".to_vec())).as_deref(), Some("Widget"));
    }

    #[test]
    fn test_inherited_media_box() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        let page_id = doc.add_object(Object::Dictionary(page));

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        assert_eq!(
            page_media_box(&doc, page_id),
            Some(Rectangle::new(0.0, 0.0, 612.0, 792.0))
        );
        assert!(page_annotation_entries(&doc, page_id).unwrap().is_none());
    }
}
