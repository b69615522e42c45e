// Field detection - classifies the focused editable surface before expansion

mod detector;
mod types;

pub use detector::{classify, resolve_deepest_focus};
pub use types::{ElementInfo, ElementTag, FieldClassification, FrameAccess};
