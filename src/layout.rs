//! Page layout calculations for the template

use std::fmt;

use crate::fields::{
    TextFieldSpec, IMAGE_SLOT_HEIGHT, IMAGE_SLOT_WIDTH, TEXT_FIELDS, TEXT_FIELD_WIDTH,
};

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// The page as a media box in points
    pub fn media_box(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width.pt() as f32, self.height.pt() as f32)
    }
}

/// An axis-aligned rectangle in PDF user space, stored as `[x0 y0 x1 y1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rectangle {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a rectangle from its bottom-left origin and size
    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Bottom-left corner, regardless of the order the corners were given in
    pub fn origin(&self) -> (f32, f32) {
        (self.x0.min(self.x1), self.y0.min(self.y1))
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.x0 + self.x1) / 2.0,
            y: (self.y0 + self.y1) / 2.0,
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            round2(self.x0),
            round2(self.y0),
            round2(self.x1),
            round2(self.y1)
        )
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// A point where a line of text starts (or is anchored)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A text input together with its caption position
#[derive(Debug, Clone, Copy)]
pub struct TextFieldPlacement {
    pub spec: TextFieldSpec,
    pub label_at: Point,
    pub rect: Rectangle,
}

/// Every fixed position on the template page
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    pub media_box: Rectangle,
    /// Centre anchor of the title line
    pub title_at: Point,
    pub text_fields: Vec<TextFieldPlacement>,
    /// Baseline start of the "Image Attachments" heading
    pub images_heading_at: Point,
    /// Image slots in the order of the required image fields
    pub image_slots: [Rectangle; 4],
    /// Baseline start of the left footer
    pub footer_left_at: Point,
    /// Right edge anchor of the right footer
    pub footer_right_at: Point,
}

/// Left margin for labels and headings
const LABEL_X: f32 = 50.0;
/// Left edge of the text inputs
const FIELD_X: f32 = 150.0;
/// Left edges of the two image columns
const IMAGE_COLUMNS: [f32; 2] = [100.0, 350.0];
/// How far below the heading the first image row begins
const HEADING_TO_IMAGES: f32 = 30.0;
/// Bottom offsets of the two image rows below that start line
const IMAGE_ROW_DROPS: [f32; 2] = [150.0, 320.0];
const FOOTER_MARGIN: f32 = 50.0;
const FOOTER_Y: f32 = 30.0;

impl TemplateLayout {
    /// Lay out the template on a page of the given size
    ///
    /// Labels run down from 100pt below the top edge. Each label advances the
    /// cursor by its field's `advance`; after the notes field the cursor sits
    /// at the image heading.
    pub fn compute(page: &PageDimensions) -> Self {
        let media_box = page.media_box();
        let width = media_box.width();
        let height = media_box.height();

        let mut y = height - 100.0;
        let mut text_fields = Vec::with_capacity(TEXT_FIELDS.len());
        for spec in TEXT_FIELDS {
            text_fields.push(TextFieldPlacement {
                spec,
                label_at: Point { x: LABEL_X, y },
                rect: Rectangle::from_origin(
                    FIELD_X,
                    y - spec.drop,
                    TEXT_FIELD_WIDTH,
                    spec.height,
                ),
            });
            y -= spec.advance;
        }

        let images_heading_at = Point { x: LABEL_X, y };
        let rows_top = y - HEADING_TO_IMAGES;

        let slot = |column: usize, row: usize| {
            Rectangle::from_origin(
                IMAGE_COLUMNS[column],
                rows_top - IMAGE_ROW_DROPS[row],
                IMAGE_SLOT_WIDTH,
                IMAGE_SLOT_HEIGHT,
            )
        };

        Self {
            media_box,
            title_at: Point {
                x: width / 2.0,
                y: height - 50.0,
            },
            text_fields,
            images_heading_at,
            image_slots: [slot(0, 0), slot(1, 0), slot(0, 1), slot(1, 1)],
            footer_left_at: Point {
                x: FOOTER_MARGIN,
                y: FOOTER_Y,
            },
            footer_right_at: Point {
                x: width - FOOTER_MARGIN,
                y: FOOTER_Y,
            },
        }
    }
}
