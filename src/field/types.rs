// Field types for classification of the focused element

use serde::{Deserialize, Serialize};

/// Classification of the focused editable surface
///
/// Closed set: the replacement strategy matches on it exhaustively, so a new
/// field kind can't be added without deciding how it is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldClassification {
    /// Single-line text-like input
    Input,
    /// Multi-line plain-text surface
    Textarea,
    /// Rich-text surface (contenteditable or a design-mode frame)
    ContentEditable,
    /// Password input, never expanded
    Password,
    /// Disabled or read-only surface
    ReadOnly,
    /// Not editable, or not reachable (cross-origin frame)
    Unknown,
}

impl FieldClassification {
    /// Whether the expansion engine may touch this field at all
    pub fn allows_expansion(&self) -> bool {
        match self {
            FieldClassification::Input
            | FieldClassification::Textarea
            | FieldClassification::ContentEditable => true,
            FieldClassification::Password
            | FieldClassification::ReadOnly
            | FieldClassification::Unknown => false,
        }
    }
}

impl std::fmt::Display for FieldClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldClassification::Input => "input",
            FieldClassification::Textarea => "textarea",
            FieldClassification::ContentEditable => "contentEditable",
            FieldClassification::Password => "password",
            FieldClassification::ReadOnly => "readonly",
            FieldClassification::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Element tag as far as classification cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementTag {
    Input,
    TextArea,
    IFrame,
    Other,
}

/// Reachability of an embedded frame's document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameAccess {
    /// Same-origin frame whose document could be inspected
    SameOrigin { design_mode_on: bool },
    /// Cross-origin or otherwise inaccessible frame
    CrossOrigin,
}

/// Host snapshot of a focused element
///
/// Hosts fill this in from whatever they can observe (DOM properties in a
/// browser binding). `shadow_active` is the shadow root's own active element,
/// if the element hosts a shadow tree with focus inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub tag: ElementTag,
    /// Raw `type` attribute for inputs
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Computed editability (inherits from ancestors)
    #[serde(default)]
    pub is_content_editable: bool,
    /// Raw `contenteditable` attribute on the element itself
    #[serde(default)]
    pub content_editable_attr: Option<String>,
    #[serde(default)]
    pub shadow_active: Option<Box<ElementInfo>>,
    #[serde(default)]
    pub frame: Option<FrameAccess>,
}

impl ElementInfo {
    fn with_tag(tag: ElementTag) -> Self {
        Self {
            tag,
            input_type: None,
            disabled: false,
            read_only: false,
            is_content_editable: false,
            content_editable_attr: None,
            shadow_active: None,
            frame: None,
        }
    }

    /// `<input>` with the given `type` attribute (None = attribute absent)
    pub fn input(input_type: Option<&str>) -> Self {
        Self {
            input_type: input_type.map(str::to_string),
            ..Self::with_tag(ElementTag::Input)
        }
    }

    pub fn textarea() -> Self {
        Self::with_tag(ElementTag::TextArea)
    }

    /// Element with `contenteditable` semantics
    pub fn content_editable() -> Self {
        Self {
            is_content_editable: true,
            content_editable_attr: Some("true".to_string()),
            ..Self::with_tag(ElementTag::Other)
        }
    }

    pub fn iframe(access: FrameAccess) -> Self {
        Self {
            frame: Some(access),
            ..Self::with_tag(ElementTag::IFrame)
        }
    }

    /// Non-editable element (body, div, button, ...)
    pub fn other() -> Self {
        Self::with_tag(ElementTag::Other)
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Attach the shadow root's focused element
    pub fn with_shadow_focus(mut self, inner: ElementInfo) -> Self {
        self.shadow_active = Some(Box::new(inner));
        self
    }
}
