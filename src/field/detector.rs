// Field detector - classifies the focused element for the expansion engine
//
// Check order matters: disabled/read-only short-circuits before any type
// logic, and password is decided before the generic input-type allow-list.

use super::types::{ElementInfo, ElementTag, FieldClassification, FrameAccess};

/// Input `type` values treated as plain text entry
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "url", "search", "tel", "number"];

/// Follow shadow-root focus links down to the element that actually has focus.
pub fn resolve_deepest_focus(element: &ElementInfo) -> &ElementInfo {
    let mut current = element;
    while let Some(inner) = current.shadow_active.as_deref() {
        current = inner;
    }
    current
}

/// Classify the focused element.
pub fn classify(focused: &ElementInfo) -> FieldClassification {
    let element = resolve_deepest_focus(focused);

    if (!element.is_content_editable && element.read_only) || element.disabled {
        return FieldClassification::ReadOnly;
    }

    let input_type = element
        .input_type
        .as_deref()
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match element.tag {
        ElementTag::Input => {
            if input_type == "password" {
                FieldClassification::Password
            } else if input_type.is_empty() || TEXT_INPUT_TYPES.contains(&input_type.as_str()) {
                FieldClassification::Input
            } else {
                FieldClassification::Unknown
            }
        }
        ElementTag::TextArea => {
            if element.read_only || element.disabled {
                FieldClassification::ReadOnly
            } else {
                FieldClassification::Textarea
            }
        }
        ElementTag::IFrame | ElementTag::Other if element.is_content_editable => {
            if element
                .content_editable_attr
                .as_deref()
                .is_some_and(|attr| attr.eq_ignore_ascii_case("false"))
            {
                FieldClassification::ReadOnly
            } else {
                FieldClassification::ContentEditable
            }
        }
        ElementTag::IFrame => match element.frame {
            Some(FrameAccess::SameOrigin { design_mode_on: true }) => {
                FieldClassification::ContentEditable
            }
            Some(FrameAccess::SameOrigin { design_mode_on: false }) => FieldClassification::Unknown,
            Some(FrameAccess::CrossOrigin) | None => {
                crate::trace!("Focused frame is not scriptable, skipping");
                FieldClassification::Unknown
            }
        },
        ElementTag::Other => FieldClassification::Unknown,
    }
}

#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;
