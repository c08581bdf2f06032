//! Template PDF creation using lopdf
//!
//! Builds the single-page Sera App form: a title, five fillable text inputs,
//! four grey image placeholders and a footer. Everything is positioned by
//! [`TemplateLayout`]; this module only turns that layout into PDF objects.
//!
//! Page text is drawn with the standard Helvetica fonts, which carry no Arabic
//! glyphs, so the on-page labels and captions are English only (`Name:`,
//! `Image 1`). The bilingual wording lives in the console output.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{text_string, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::Result;
use crate::fields::{DEFAULT_TEMPLATE_PATH, REQUIRED_IMAGE_FIELDS};
use crate::layout::{PageDimensions, Point, Rectangle, TemplateLayout, TextFieldPlacement};
use crate::pdf::fonts::{add_standard_font, encode_text, escape_pdf_string, StandardFont};

/// Fill grey of the image placeholders
const PLACEHOLDER_FILL: f32 = 0.827;
/// Stroke grey of the image placeholders
const PLACEHOLDER_STROKE: f32 = 0.502;
/// Push-button flag (bit 17) in a field's `/Ff`
const FF_PUSHBUTTON: i64 = 1 << 16;
/// Annotation flag: print
const ANNOT_PRINT: i64 = 4;
/// Default appearance for field text
const FIELD_DA: &str = "/Helv 12 Tf 0 g";

/// Options for building the template
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Where to write the template; the parent directory is created if needed
    pub output_path: PathBuf,
    /// Title centred at the top of the page
    pub title: String,
    /// Page size
    pub page: PageDimensions,
    /// Also emit named `Image_N` push-button fields over the placeholders
    pub image_fields: bool,
    /// Footer text at the bottom left
    pub footer_left: String,
    /// Footer text at the bottom right
    pub footer_right: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            title: "Sera App - Form Template".to_string(),
            page: PageDimensions::a4(),
            image_fields: false,
            footer_left: "Template created for Sera App".to_string(),
            footer_right: "Generated PDF Template".to_string(),
        }
    }
}

/// A named field placed on the template
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlacement {
    pub name: String,
    pub rect: Rectangle,
}

/// Summary of a template that was written to disk
#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub page_count: usize,
    pub text_fields: Vec<FieldPlacement>,
    /// Placeholder rectangles, in the order of the required image fields
    pub image_slots: [Rectangle; 4],
    /// Whether the placeholders carry named `Image_N` fields
    pub image_fields: bool,
}

/// Build the template and write it to `options.output_path`
///
/// Any existing file is replaced. The document is first written next to the
/// target and then renamed over it, so a failure never leaves a truncated
/// template behind.
///
/// # Example
///
/// ```no_run
/// use sera_template::pdf::{build_template, TemplateOptions};
///
/// let template = build_template(&TemplateOptions::default())
///     .expect("Failed to build template");
/// println!("{}", template.path.display());
/// ```
pub fn build_template(options: &TemplateOptions) -> Result<Template> {
    let layout = TemplateLayout::compute(&options.page);
    let mut doc = template_document(options, &layout);

    doc.compress();
    save_replacing(&mut doc, &options.output_path)?;

    log::debug!(
        "wrote template with {} text fields to {}",
        layout.text_fields.len(),
        options.output_path.display()
    );

    Ok(Template {
        path: options.output_path.clone(),
        page_count: 1,
        text_fields: layout
            .text_fields
            .iter()
            .map(|p| FieldPlacement {
                name: p.spec.name.to_string(),
                rect: p.rect,
            })
            .collect(),
        image_slots: layout.image_slots,
        image_fields: options.image_fields,
    })
}

/// Assemble the template as an in-memory document
pub fn template_document(options: &TemplateOptions, layout: &TemplateLayout) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let regular = add_standard_font(&mut doc, StandardFont::Helvetica);
    let bold = add_standard_font(&mut doc, StandardFont::HelveticaBold);

    let content = page_content(options, layout);
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut annots = Vec::new();
    for placement in &layout.text_fields {
        let field_id = add_text_field(&mut doc, page_id, placement, regular);
        annots.push(Object::Reference(field_id));
    }

    if options.image_fields {
        for (index, (name, slot)) in REQUIRED_IMAGE_FIELDS
            .iter()
            .zip(layout.image_slots.iter())
            .enumerate()
        {
            let field_id = add_image_field(&mut doc, page_id, name, index + 1, slot, regular);
            annots.push(Object::Reference(field_id));
        }
    } else {
        log::warn!(
            "image placeholders are drawn as graphics only; {} will not be found as fields",
            REQUIRED_IMAGE_FIELDS.join(", ")
        );
    }

    // Page
    let mut fonts = Dictionary::new();
    fonts.set(
        StandardFont::Helvetica.resource_name(),
        Object::Reference(regular),
    );
    fonts.set(
        StandardFont::HelveticaBold.resource_name(),
        Object::Reference(bold),
    );
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", rect_object(&layout.media_box));
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Dictionary(resources));
    page.set("Annots", Object::Array(annots.clone()));
    doc.objects.insert(page_id, Object::Dictionary(page));

    // Page tree
    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    // Interactive form
    let mut form_fonts = Dictionary::new();
    form_fonts.set("Helv", Object::Reference(regular));
    let mut default_resources = Dictionary::new();
    default_resources.set("Font", Object::Dictionary(form_fonts));

    let mut acroform = Dictionary::new();
    acroform.set("Fields", Object::Array(annots));
    acroform.set("NeedAppearances", Object::Boolean(true));
    acroform.set("DA", literal(FIELD_DA));
    acroform.set("DR", Object::Dictionary(default_resources));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    catalog.set("AcroForm", Object::Dictionary(acroform));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = doc.add_object(Object::Dictionary(info_dictionary(&options.title)));
    doc.trailer.set("Info", Object::Reference(info_id));

    doc
}

/// Generate the page content stream
///
/// Text goes in with `BT ... ET` blocks; each placeholder is a filled and
/// stroked `re` followed by its caption.
fn page_content(options: &TemplateOptions, layout: &TemplateLayout) -> String {
    let mut content = String::new();
    content.push_str("0 g\n");

    draw_centred(
        &mut content,
        StandardFont::HelveticaBold,
        16.0,
        layout.title_at,
        &options.title,
    );

    for placement in &layout.text_fields {
        draw_text(
            &mut content,
            StandardFont::Helvetica,
            12.0,
            placement.label_at,
            placement.spec.label,
        );
    }

    draw_text(
        &mut content,
        StandardFont::HelveticaBold,
        14.0,
        layout.images_heading_at,
        "Image Attachments:",
    );

    for (i, slot) in layout.image_slots.iter().enumerate() {
        let (x, y) = slot.origin();
        content.push_str("q\n");
        content.push_str(&format!("{} G\n", num(PLACEHOLDER_STROKE)));
        content.push_str(&format!("{} g\n", num(PLACEHOLDER_FILL)));
        content.push_str(&format!(
            "{} {} {} {} re\nB\n",
            num(x),
            num(y),
            num(slot.width()),
            num(slot.height())
        ));
        content.push_str("Q\n");

        draw_centred(
            &mut content,
            StandardFont::Helvetica,
            10.0,
            slot.center(),
            &format!("Image {}", i + 1),
        );
    }

    draw_text(
        &mut content,
        StandardFont::Helvetica,
        8.0,
        layout.footer_left_at,
        &options.footer_left,
    );
    draw_right(
        &mut content,
        StandardFont::Helvetica,
        8.0,
        layout.footer_right_at,
        &options.footer_right,
    );

    content
}

fn draw_text(content: &mut String, font: StandardFont, size: f32, at: Point, text: &str) {
    content.push_str("BT\n");
    content.push_str(&format!("/{} {} Tf\n", font.resource_name(), num(size)));
    content.push_str(&format!("{} {} Td\n", num(at.x), num(at.y)));
    content.push_str(&format!("({}) Tj\n", escape_pdf_string(&encode_text(text))));
    content.push_str("ET\n");
}

fn draw_centred(content: &mut String, font: StandardFont, size: f32, at: Point, text: &str) {
    let width = font.text_width(text, size);
    let start = Point {
        x: at.x - width / 2.0,
        y: at.y,
    };
    draw_text(content, font, size, start, text);
}

fn draw_right(content: &mut String, font: StandardFont, size: f32, at: Point, text: &str) {
    let width = font.text_width(text, size);
    let start = Point {
        x: at.x - width,
        y: at.y,
    };
    draw_text(content, font, size, start, text);
}

/// Add a text input widget and return its object ID
fn add_text_field(
    doc: &mut Document,
    page_id: ObjectId,
    placement: &TextFieldPlacement,
    font_id: ObjectId,
) -> ObjectId {
    let rect = placement.rect;
    let appearance_id = add_field_appearance(doc, &rect, 1.0, 0.0, font_id);

    let mut border_colors = Dictionary::new();
    border_colors.set("BC", gray_array(0.0));
    border_colors.set("BG", gray_array(1.0));

    let mut border_style = Dictionary::new();
    border_style.set("W", Object::Integer(1));
    border_style.set("S", Object::Name(b"I".to_vec()));

    let mut appearance = Dictionary::new();
    appearance.set("N", Object::Reference(appearance_id));

    let mut field = widget(page_id, &rect);
    field.set("FT", Object::Name(b"Tx".to_vec()));
    field.set("T", text_string(placement.spec.name));
    field.set("TU", text_string(placement.spec.tooltip));
    field.set("DA", literal(FIELD_DA));
    field.set("MK", Object::Dictionary(border_colors));
    field.set("BS", Object::Dictionary(border_style));
    field.set("AP", Object::Dictionary(appearance));

    doc.add_object(Object::Dictionary(field))
}

/// Add a push-button widget named after a required image field
fn add_image_field(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    number: usize,
    slot: &Rectangle,
    font_id: ObjectId,
) -> ObjectId {
    let appearance_id =
        add_field_appearance(doc, slot, PLACEHOLDER_FILL, PLACEHOLDER_STROKE, font_id);

    let mut characteristics = Dictionary::new();
    characteristics.set("BC", gray_array(PLACEHOLDER_STROKE));
    characteristics.set("BG", gray_array(PLACEHOLDER_FILL));
    characteristics.set("CA", text_string(&format!("Image {number}")));

    let mut appearance = Dictionary::new();
    appearance.set("N", Object::Reference(appearance_id));

    let mut field = widget(page_id, slot);
    field.set("FT", Object::Name(b"Btn".to_vec()));
    field.set("Ff", Object::Integer(FF_PUSHBUTTON));
    field.set("T", text_string(name));
    field.set("TU", text_string(&format!("Image {number} placeholder")));
    field.set("DA", literal(FIELD_DA));
    field.set("MK", Object::Dictionary(characteristics));
    field.set("AP", Object::Dictionary(appearance));

    doc.add_object(Object::Dictionary(field))
}

/// Common part of every widget annotation
fn widget(page_id: ObjectId, rect: &Rectangle) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Annot".to_vec()));
    dict.set("Subtype", Object::Name(b"Widget".to_vec()));
    dict.set("Rect", rect_object(rect));
    dict.set("F", Object::Integer(ANNOT_PRINT));
    dict.set("P", Object::Reference(page_id));
    dict
}

/// Normal appearance for a field: a filled box with a 1pt border and an
/// inset shadow along the top and left edges
fn add_field_appearance(
    doc: &mut Document,
    rect: &Rectangle,
    fill: f32,
    stroke: f32,
    font_id: ObjectId,
) -> ObjectId {
    let (w, h) = (rect.width(), rect.height());

    let mut content = String::new();
    content.push_str(&format!("{} g\n", num(fill)));
    content.push_str(&format!("0 0 {} {} re\nf\n", num(w), num(h)));
    content.push_str(&format!("{} G\n1 w\n", num(stroke)));
    content.push_str(&format!("0.5 0.5 {} {} re\nS\n", num(w - 1.0), num(h - 1.0)));
    content.push_str("0.5 G\n");
    content.push_str(&format!(
        "1.5 1.5 m\n1.5 {} l\n{} {} l\nS\n",
        num(h - 1.5),
        num(w - 1.5),
        num(h - 1.5)
    ));

    let mut fonts = Dictionary::new();
    fonts.set("Helv", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Form".to_vec()));
    dict.set("FormType", Object::Integer(1));
    dict.set("BBox", rect_object(&Rectangle::new(0.0, 0.0, w, h)));
    dict.set("Resources", Object::Dictionary(resources));

    doc.add_object(Stream::new(dict, content.into_bytes()))
}

/// Document information dictionary with a local creation timestamp
fn info_dictionary(title: &str) -> Dictionary {
    let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();

    let mut info = Dictionary::new();
    info.set("Title", text_string(title));
    info.set("Creator", text_string(env!("CARGO_PKG_NAME")));
    info.set(
        "Producer",
        text_string(&format!(
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )),
    );
    info.set("CreationDate", literal(&created));
    info
}

/// Write the document to a sibling file, then move it over `path`
fn save_replacing(doc: &mut Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut partial = OsString::from(path.as_os_str());
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    if let Err(e) = doc.save(&partial) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    Ok(())
}

fn rect_object(rect: &Rectangle) -> Object {
    Object::Array(vec![
        Object::Real(rect.x0),
        Object::Real(rect.y0),
        Object::Real(rect.x1),
        Object::Real(rect.y1),
    ])
}

fn gray_array(level: f32) -> Object {
    Object::Array(vec![
        Object::Real(level),
        Object::Real(level),
        Object::Real(level),
    ])
}

/// ASCII byte string, for values that are not text strings (`/DA`, dates)
fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// Format a coordinate for a content stream, rounded to 1/1000 pt
fn num(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}
