//! Field naming contract shared by the template builder and the auditor
//!
//! The Sera App locates its image slots by annotation name, so the builder and
//! the auditor must agree on these names. Both read them from here.

/// Where the builder writes the template and the auditor looks for it
pub const DEFAULT_TEMPLATE_PATH: &str = "SeraApp/template_with_placeholders.pdf";

/// Image fields the app expects to find in the template, in slot order
pub const REQUIRED_IMAGE_FIELDS: [&str; 4] = ["Image_1", "Image_2", "Image_3", "Image_4"];

/// Size of every image placeholder in points
pub const IMAGE_SLOT_WIDTH: f32 = 200.0;
pub const IMAGE_SLOT_HEIGHT: f32 = 150.0;

/// Width of every text input in points
pub const TEXT_FIELD_WIDTH: f32 = 300.0;

/// A fillable text input on the template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFieldSpec {
    /// Field name written to `/T`
    pub name: &'static str,
    /// Caption drawn to the left of the input
    pub label: &'static str,
    /// Tooltip written to `/TU`
    pub tooltip: &'static str,
    /// Input height in points
    pub height: f32,
    /// How far the input's bottom edge sits below the label baseline
    pub drop: f32,
    /// Vertical distance from this label to the next one
    pub advance: f32,
}

/// The five text inputs, top to bottom
pub const TEXT_FIELDS: [TextFieldSpec; 5] = [
    TextFieldSpec {
        name: "name",
        label: "Name:",
        tooltip: "Enter your full name",
        height: 20.0,
        drop: 5.0,
        advance: 40.0,
    },
    TextFieldSpec {
        name: "email",
        label: "Email:",
        tooltip: "Enter your email address",
        height: 20.0,
        drop: 5.0,
        advance: 40.0,
    },
    TextFieldSpec {
        name: "phone",
        label: "Phone:",
        tooltip: "Enter your phone number",
        height: 20.0,
        drop: 5.0,
        advance: 40.0,
    },
    TextFieldSpec {
        name: "address",
        label: "Address:",
        tooltip: "Enter your address",
        height: 20.0,
        drop: 5.0,
        advance: 60.0,
    },
    TextFieldSpec {
        name: "notes",
        label: "Notes:",
        tooltip: "Additional notes",
        height: 60.0,
        drop: 45.0,
        advance: 120.0,
    },
];

/// Check whether a field name belongs to the required image set
pub fn is_required_image_field(name: &str) -> bool {
    REQUIRED_IMAGE_FIELDS.contains(&name)
}

/// Names of the required image fields that do not appear in `found`
///
/// The result keeps the order of [`REQUIRED_IMAGE_FIELDS`].
pub fn missing_image_fields<'a, I>(found: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let found: Vec<&str> = found.into_iter().collect();
    REQUIRED_IMAGE_FIELDS
        .iter()
        .copied()
        .filter(|required| !found.contains(required))
        .collect()
}
