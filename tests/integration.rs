//! Integration tests: build a template on disk, then audit it

use lopdf::Document;
use sera_template::audit::{audit, run_audit};
use sera_template::fields::{REQUIRED_IMAGE_FIELDS, TEXT_FIELDS};
use sera_template::pdf::{build_template, Template, TemplateOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a template inside `dir` with the given image field setting
fn build_in(dir: &Path, image_fields: bool) -> Template {
    let options = TemplateOptions {
        output_path: dir.join("SeraApp").join("template_with_placeholders.pdf"),
        image_fields,
        ..Default::default()
    };
    build_template(&options).expect("Failed to build template")
}

/// Rectangles drawn with `re` in the page content, as (x, y, w, h)
fn drawn_rectangles(path: &PathBuf) -> Vec<[f32; 4]> {
    let mut doc = Document::load(path).expect("Failed to load template");
    doc.decompress();
    let page_id = *doc.get_pages().values().next().expect("No pages");
    let content = doc.get_page_content(page_id).expect("No page content");
    let content = String::from_utf8_lossy(&content);

    let tokens: Vec<&str> = content.split_whitespace().collect();
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| **token == "re")
        .filter_map(|(i, _)| {
            let operands: Vec<f32> = tokens[i.checked_sub(4)?..i]
                .iter()
                .filter_map(|t| t.parse().ok())
                .collect();
            (operands.len() == 4).then(|| [operands[0], operands[1], operands[2], operands[3]])
        })
        .collect()
}

#[test]
fn test_build_then_audit_finds_text_fields() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = build_in(temp_dir.path(), false);

    let report = audit(&template.path).expect("Failed to audit template");
    assert_eq!(report.page_count(), template.page_count);
    assert_eq!(report.page_count(), 1);

    let media_box = report.pages[0].media_box.expect("Page should have a media box");
    assert!((media_box.width() - 595.28).abs() < 0.01);
    assert!((media_box.height() - 841.89).abs() < 0.01);

    for spec in TEXT_FIELDS {
        let annotation = report
            .annotation(spec.name)
            .unwrap_or_else(|| panic!("Text field {} not found", spec.name));
        assert_eq!(annotation.subtype.as_deref(), Some("Widget"));
        let rect = annotation.rect.expect("Text field should have a rectangle");
        assert!((rect.width() - 300.0).abs() < 0.01);
        assert!((rect.height() - spec.height).abs() < 0.01);
    }

    let listed: Vec<&str> = report.form_fields.iter().map(|f| f.name.as_str()).collect();
    let expected: Vec<&str> = TEXT_FIELDS.iter().map(|f| f.name).collect();
    assert_eq!(listed, expected);
    assert_eq!(report.title.as_deref(), Some("Sera App - Form Template"));
}

#[test]
fn test_placeholders_are_drawn_at_fixed_positions() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = build_in(temp_dir.path(), false);

    let height = 841.8898_f32;
    let expected = [
        (100.0, height - 580.0),
        (350.0, height - 580.0),
        (100.0, height - 750.0),
        (350.0, height - 750.0),
    ];

    let placeholders: Vec<[f32; 4]> = drawn_rectangles(&template.path)
        .into_iter()
        .filter(|r| (r[2] - 200.0).abs() < 0.01 && (r[3] - 150.0).abs() < 0.01)
        .collect();
    assert_eq!(placeholders.len(), 4, "Expected four 200x150 placeholders");

    for (drawn, (x, y)) in placeholders.iter().zip(expected) {
        assert!((drawn[0] - x).abs() < 0.01, "x {} != {}", drawn[0], x);
        assert!((drawn[1] - y).abs() < 0.01, "y {} != {}", drawn[1], y);
    }

    for (slot, (x, y)) in template.image_slots.iter().zip(expected) {
        assert!((slot.x0 - x).abs() < 0.01);
        assert!((slot.y0 - y).abs() < 0.01);
    }
}

#[test]
fn test_default_template_is_missing_all_image_fields() {
    // The placeholders are graphics only, so the app's image fields are absent
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = build_in(temp_dir.path(), false);

    let report = audit(&template.path).expect("Failed to audit template");
    assert!(report.required.found.is_empty());
    assert_eq!(report.required.missing, REQUIRED_IMAGE_FIELDS.to_vec());
    assert!(!report.required.is_complete());

    let text = report.to_string();
    assert!(text.contains("[Image_1, Image_2, Image_3, Image_4]"));
    assert!(!text.contains("All image fields present"));
}

#[test]
fn test_image_field_template_passes_audit() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = build_in(temp_dir.path(), true);

    let report = audit(&template.path).expect("Failed to audit template");
    assert!(report.required.is_complete());

    let found: Vec<&str> = report.required.found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(found, REQUIRED_IMAGE_FIELDS.to_vec());
    assert!(report.required.found.iter().all(|f| f.page == 1));

    for (name, slot) in REQUIRED_IMAGE_FIELDS.iter().zip(template.image_slots.iter()) {
        let rect = report.annotation(name).and_then(|a| a.rect).expect("Image field rect");
        assert!((rect.x0 - slot.x0).abs() < 0.01);
        assert!((rect.y0 - slot.y0).abs() < 0.01);
    }

    // Image fields are buttons, not text fields
    assert_eq!(report.form_fields.len(), TEXT_FIELDS.len());
    assert!(report.to_string().contains("All image fields present"));
}

#[test]
fn test_rebuild_overwrites_existing_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let first = build_in(temp_dir.path(), true);
    let second = build_in(temp_dir.path(), false);
    assert_eq!(first.path, second.path);

    let report = audit(&second.path).expect("Failed to audit template");
    assert_eq!(report.required.missing.len(), REQUIRED_IMAGE_FIELDS.len());
}

#[test]
fn test_build_fails_when_parent_is_a_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("SeraApp");
    std::fs::write(&blocker, b"not a directory").expect("Failed to write blocker");

    let options = TemplateOptions {
        output_path: blocker.join("template.pdf"),
        ..Default::default()
    };
    assert!(build_template(&options).is_err());
    assert!(!blocker.join("template.pdf").exists());
}

/// Sibling path the builder writes to before renaming
fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    PathBuf::from(partial)
}

#[test]
fn test_failed_rename_removes_partial_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // A non-empty directory in the way: the save succeeds, the rename cannot
    let target = temp_dir.path().join("template.pdf");
    std::fs::create_dir(&target).expect("Failed to create directory");
    std::fs::write(target.join("keep"), b"x").expect("Failed to write file");

    let options = TemplateOptions {
        output_path: target.clone(),
        ..Default::default()
    };
    assert!(build_template(&options).is_err());

    assert!(target.is_dir());
    assert!(target.join("keep").exists());
    assert!(!partial_path(&target).exists());
}

#[test]
fn test_failed_save_leaves_no_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let target = temp_dir.path().join("template.pdf");
    // The sibling path is taken by a directory, so writing the document fails
    std::fs::create_dir(partial_path(&target)).expect("Failed to create directory");

    let options = TemplateOptions {
        output_path: target.clone(),
        ..Default::default()
    };
    assert!(build_template(&options).is_err());
    assert!(!target.exists());
}

#[test]
fn test_non_ascii_title_survives_audit() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = TemplateOptions {
        output_path: temp_dir.path().join("template.pdf"),
        title: "قالب سيرا".to_string(),
        ..Default::default()
    };
    let template = build_template(&options).expect("Failed to build template");

    let report = audit(&template.path).expect("Failed to audit template");
    assert_eq!(report.title.as_deref(), Some("قالب سيرا"));
}

#[test]
fn test_run_audit_prints_report() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = build_in(temp_dir.path(), false);

    let mut out = Vec::new();
    run_audit(&template.path, &mut out).expect("Writing to a Vec cannot fail");
    let text = String::from_utf8(out).expect("Report should be UTF-8");

    assert!(text.contains("عدد الصفحات: 1"));
    assert!(text.contains("عدد الحقول/التعليقات: 5"));
    for spec in TEXT_FIELDS {
        assert!(text.contains(&format!("'{}'", spec.name)));
    }
    assert!(text.contains("❌ Missing / مفقود"));
}

#[test]
fn test_run_audit_nonexistent_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let missing = temp_dir.path().join("SeraApp").join("template_with_placeholders.pdf");

    let mut out = Vec::new();
    run_audit(&missing, &mut out).expect("Missing files are reported, not returned");
    let text = String::from_utf8(out).expect("Report should be UTF-8");

    assert!(text.contains("File not found"));
    assert!(text.contains("template_with_placeholders.pdf"));
}
